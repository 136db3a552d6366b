use std::io::{self, BufRead, Write};

use collections::{Dict, DictConfig, DictError};
use log::{debug, trace};
use thiserror::Error;

use crate::protocol::{Command, LineProtocol, Protocol, ProtocolError, Reply};
use crate::util;

#[derive(Debug, Error)]
pub enum SessionError {
    /// Derived IO error
    #[error("Io error: {0}")]
    Io(#[from] io::Error),

    #[error("Dictionary error: {0}")]
    Dict(#[from] DictError),
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum SessionState {
    WantRead,
    WantClose,
}

/// Serves line commands against one [`Dict`]
#[derive(Debug)]
pub struct Session {
    dict: Dict,
    state: SessionState,
}

impl Default for Session {
    fn default() -> Self {
        Self::new(Dict::new())
    }
}

impl Session {
    pub fn new(dict: Dict) -> Self {
        Self {
            dict,
            state: SessionState::WantRead,
        }
    }

    pub fn with_config(config: DictConfig) -> Result<Self, SessionError> {
        Ok(Self::new(Dict::with_config(config)?))
    }

    pub fn dict(&self) -> &Dict {
        &self.dict
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn want_close(&self) -> bool {
        matches!(self.state, SessionState::WantClose)
    }

    /// Parses and runs one line. Blank lines get no reply.
    pub fn handle_line(&mut self, line: &str) -> Option<Reply> {
        match LineProtocol::parse(line) {
            Ok(cmd) => Some(self.execute(cmd)),
            Err(ProtocolError::Empty) => None,
            Err(e) => {
                debug!(target: "handle_line", "bad request {line:?}: {e}");
                Some(Reply::Err(e.to_string()))
            }
        }
    }

    pub fn execute(&mut self, cmd: Command) -> Reply {
        trace!(target: "execute", "{cmd:?}");
        match cmd {
            Command::Store { key, value } => match self.dict.store(&key, value) {
                Ok(None) => Reply::Ok,
                Ok(Some(prev)) => Reply::Updated(prev),
                Err(e) => Reply::Err(e.to_string()),
            },
            Command::Retrieve(key) => match self.dict.retrieve(&key) {
                Some(v) => Reply::Value(v.to_vec()),
                None => Reply::NotFound,
            },
            Command::Contains(key) => Reply::Bool(self.dict.contains(&key)),
            Command::Delete(key) => match self.dict.delete(&key) {
                Some(_) => Reply::Ok,
                None => Reply::NotFound,
            },
            Command::Size => Reply::Count(self.dict.size()),
            Command::Capacity => Reply::Count(self.dict.capacity()),
            Command::Load => Reply::Ratio(self.dict.load_factor()),
            Command::Print => Reply::Text(self.dict.to_string()),
            Command::List => {
                let mut out = String::new();
                self.dict.for_each(|k, v| {
                    out.push_str(&format!("{k} = {}\n", String::from_utf8_lossy(v)));
                });
                Reply::Text(out)
            }
            Command::Quit => {
                self.state = SessionState::WantClose;
                Reply::Bye
            }
        }
    }

    /// Reads commands from `input` until EOF or `quit`,
    /// writing one reply per command to `output`
    ///
    /// A closed `output` ends the session without an error.
    pub fn run<R, W>(&mut self, mut input: R, mut output: W) -> Result<(), SessionError>
    where
        R: BufRead,
        W: Write,
    {
        let mut line = String::new();
        while !self.want_close() {
            line.clear();
            match input.read_line(&mut line) {
                Ok(0) => {
                    trace!(target: "run", "input EOF");
                    self.state = SessionState::WantClose;
                    break;
                }
                Ok(_) => {}
                Err(ref e) if util::interrupted(e) => continue,
                Err(e) => return Err(e.into()),
            }

            let Some(reply) = self.handle_line(&line) else {
                continue;
            };

            let written = output
                .write_all(LineProtocol::encode(&reply).as_bytes())
                .and_then(|_| output.flush());
            match written {
                Ok(()) => {}
                Err(ref e) if util::broken_pipe(e) => {
                    debug!(target: "run", "output closed, ending session");
                    self.state = SessionState::WantClose;
                }
                Err(e) => return Err(e.into()),
            }
        }
        Ok(())
    }
}
