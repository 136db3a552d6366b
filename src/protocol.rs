use thiserror::Error;

#[derive(Error, Debug, PartialEq, Eq)]
pub enum ProtocolError {
    /// Nothing but whitespace on the line
    #[error("empty command")]
    Empty,

    #[error("unknown command: {0}")]
    UnknownCommand(String),

    #[error("{cmd} takes {want} argument(s), got {got}")]
    WrongArity {
        cmd: &'static str,
        want: usize,
        got: usize,
    },

    #[error("unterminated quote")]
    UnterminatedQuote,
}

pub trait Protocol {
    type Request;
    type Response;

    fn parse(line: &str) -> Result<Self::Request, ProtocolError>;
    fn encode(response: &Self::Response) -> String;

    fn encode_many(responses: &[Self::Response]) -> String {
        let mut s = String::new();
        for response in responses {
            s.push_str(&Self::encode(response));
        }
        s
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Store { key: String, value: String },
    Retrieve(String),
    Contains(String),
    Delete(String),
    Size,
    Capacity,
    Load,
    Print,
    List,
    Quit,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Reply {
    Ok,
    /// Store replaced an existing value
    Updated(Vec<u8>),
    Value(Vec<u8>),
    NotFound,
    Bool(bool),
    Count(usize),
    Ratio(f64),
    /// Multi line dump, sent as is
    Text(String),
    Err(String),
    Bye,
}

/// One command per line, words separated by whitespace,
/// double quotes group words into one argument
///
/// ```text
/// store "Los Angeles" Lakers
/// retrieve "Los Angeles"
/// ```
pub struct LineProtocol;

impl LineProtocol {
    fn split(line: &str) -> Result<Vec<String>, ProtocolError> {
        let mut words = Vec::new();
        let mut chars = line.chars().peekable();

        loop {
            while chars.next_if(|c| c.is_whitespace()).is_some() {}
            let Some(&c) = chars.peek() else {
                break;
            };

            let mut word = String::new();
            if c == '"' {
                chars.next();
                loop {
                    match chars.next() {
                        Some('"') => break,
                        Some(c) => word.push(c),
                        None => return Err(ProtocolError::UnterminatedQuote),
                    }
                }
            } else {
                while let Some(c) = chars.next_if(|c| !c.is_whitespace()) {
                    word.push(c);
                }
            }
            words.push(word);
        }

        Ok(words)
    }

    /// Checks that exactly `N` arguments were given
    fn take<const N: usize>(
        cmd: &'static str,
        args: Vec<String>,
    ) -> Result<[String; N], ProtocolError> {
        let got = args.len();
        args.try_into()
            .map_err(|_| ProtocolError::WrongArity { cmd, want: N, got })
    }
}

impl Protocol for LineProtocol {
    type Request = Command;
    type Response = Reply;

    fn parse(line: &str) -> Result<Command, ProtocolError> {
        let mut words = Self::split(line)?;
        if words.is_empty() {
            return Err(ProtocolError::Empty);
        }
        let name = words.remove(0).to_lowercase();
        let args = words;

        let cmd = match name.as_str() {
            "store" | "set" => {
                let [key, value] = Self::take::<2>("store", args)?;
                Command::Store { key, value }
            }
            "retrieve" | "get" => {
                let [key] = Self::take::<1>("retrieve", args)?;
                Command::Retrieve(key)
            }
            "contains" => {
                let [key] = Self::take::<1>("contains", args)?;
                Command::Contains(key)
            }
            "delete" | "del" => {
                let [key] = Self::take::<1>("delete", args)?;
                Command::Delete(key)
            }
            "size" => Self::take::<0>("size", args).map(|_| Command::Size)?,
            "capacity" => Self::take::<0>("capacity", args).map(|_| Command::Capacity)?,
            "load" => Self::take::<0>("load", args).map(|_| Command::Load)?,
            "print" => Self::take::<0>("print", args).map(|_| Command::Print)?,
            "list" => Self::take::<0>("list", args).map(|_| Command::List)?,
            "quit" | "exit" => Self::take::<0>("quit", args).map(|_| Command::Quit)?,
            _ => return Err(ProtocolError::UnknownCommand(name)),
        };

        Ok(cmd)
    }

    fn encode(reply: &Reply) -> String {
        match reply {
            Reply::Ok => "OK\n".into(),
            Reply::Updated(prev) => format!("OK {}\n", String::from_utf8_lossy(prev)),
            Reply::Value(v) => format!("VALUE {}\n", String::from_utf8_lossy(v)),
            Reply::NotFound => "NOT FOUND\n".into(),
            Reply::Bool(true) => "TRUE\n".into(),
            Reply::Bool(false) => "FALSE\n".into(),
            Reply::Count(n) => format!("{n}\n"),
            Reply::Ratio(r) => format!("{r:.3}\n"),
            Reply::Text(text) if text.ends_with('\n') => text.clone(),
            Reply::Text(text) => format!("{text}\n"),
            Reply::Err(msg) => format!("ERR {msg}\n"),
            Reply::Bye => "BYE\n".into(),
        }
    }
}
