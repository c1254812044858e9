//! Operation names
//!
//! Classifies an operation name into the strategy that serves it. The
//! classification is a pure function of the name and two fixed membership
//! sets; nothing is registered or cached at runtime.
//!
//! Rules, first match wins, in this order:
//!
//! | Name | Strategy |
//! |------|----------|
//! | `arun` | explicit run, first argument is the command |
//! | `a<simple>` | blocking method submitted directly |
//! | `a<run-wrap>` | synchronous form executed asynchronously |
//! | `arun_<cmd>` | run `cmd` |
//! | `adelete_<cmd>` | run `cmd -d` |
//! | `afetch_<cmd>` | fetch-one |
//! | `asave_<cmd>` | save-one |
//! | `aiterate_<cmd>` | iterate-many |
//!
//! This order deliberately differs from a plain prefix-first reading, in
//! which `arun_<cmd>` and `adelete_<cmd>` would be tried before the two
//! membership sets. Here the sets are exact names and are always checked
//! first. Every run-wrap member starts with `run_` or `delete_`, so the
//! prefix-first order would read `arun_submit` as a plain `submit` run and
//! drop its input shaping. `arun_tickets` likewise resolves to the simple
//! method, not to `arun("tickets")`.

use std::fmt;

/// Blocking session methods submitted as-is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SimpleMethod {
    Connect,
    Disconnect,
    RunTickets,
}

/// The simple-wrap membership set.
pub const SIMPLE_WRAP_METHODS: [SimpleMethod; 3] = [
    SimpleMethod::Connect,
    SimpleMethod::Disconnect,
    SimpleMethod::RunTickets,
];

impl SimpleMethod {
    /// The blocking method name.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Connect => "connect",
            Self::Disconnect => "disconnect",
            Self::RunTickets => "run_tickets",
        }
    }

    fn from_name(name: &str) -> Option<Self> {
        SIMPLE_WRAP_METHODS.into_iter().find(|m| m.name() == name)
    }
}

/// Multi-step commands whose synchronous form shapes arguments or input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RunWrapMethod {
    Submit,
    Shelve,
    DeleteShelve,
    Login,
    Password,
    Filelog,
    Print,
    Resolve,
}

/// The run-wrap membership set.
pub const RUN_WRAP_METHODS: [RunWrapMethod; 8] = [
    RunWrapMethod::Submit,
    RunWrapMethod::Shelve,
    RunWrapMethod::DeleteShelve,
    RunWrapMethod::Login,
    RunWrapMethod::Password,
    RunWrapMethod::Filelog,
    RunWrapMethod::Print,
    RunWrapMethod::Resolve,
];

impl RunWrapMethod {
    /// The synchronous method name.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Submit => "run_submit",
            Self::Shelve => "run_shelve",
            Self::DeleteShelve => "delete_shelve",
            Self::Login => "run_login",
            Self::Password => "run_password",
            Self::Filelog => "run_filelog",
            Self::Print => "run_print",
            Self::Resolve => "run_resolve",
        }
    }

    /// The server command the method ends up running.
    #[must_use]
    pub const fn command(self) -> &'static str {
        match self {
            Self::Submit => "submit",
            Self::Shelve | Self::DeleteShelve => "shelve",
            Self::Login => "login",
            Self::Password => "passwd",
            Self::Filelog => "filelog",
            Self::Print => "print",
            Self::Resolve => "resolve",
        }
    }

    fn from_name(name: &str) -> Option<Self> {
        RUN_WRAP_METHODS.into_iter().find(|m| m.name() == name)
    }
}

/// A classified operation name.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum OperationName {
    /// `arun`: the command is the first call argument.
    Explicit,
    /// `arun_<cmd>`
    Run { command: String },
    /// `adelete_<cmd>`
    Delete { command: String },
    /// `afetch_<cmd>`
    Fetch { command: String },
    /// `asave_<cmd>`
    Save { command: String },
    /// `aiterate_<cmd>`
    Iterate { command: String },
    /// `a` + simple-wrap method
    Simple(SimpleMethod),
    /// `a` + run-wrap method
    RunWrap(RunWrapMethod),
}

impl OperationName {
    /// Classify `name`, or `None` if no rule matches.
    ///
    /// A prefix with an empty command (`arun_`) does not match its rule.
    #[must_use]
    pub fn parse(name: &str) -> Option<Self> {
        if name == "arun" {
            return Some(Self::Explicit);
        }

        if let Some(method) = name.strip_prefix('a') {
            if let Some(simple) = SimpleMethod::from_name(method) {
                return Some(Self::Simple(simple));
            }
            if let Some(wrapped) = RunWrapMethod::from_name(method) {
                return Some(Self::RunWrap(wrapped));
            }
        }

        let command = |prefix: &str| {
            name.strip_prefix(prefix)
                .filter(|cmd| !cmd.is_empty())
                .map(str::to_string)
        };

        if let Some(command) = command("arun_") {
            return Some(Self::Run { command });
        }
        if let Some(command) = command("adelete_") {
            return Some(Self::Delete { command });
        }
        if let Some(command) = command("afetch_") {
            return Some(Self::Fetch { command });
        }
        if let Some(command) = command("asave_") {
            return Some(Self::Save { command });
        }
        command("aiterate_").map(|command| Self::Iterate { command })
    }
}

impl fmt::Display for OperationName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Explicit => write!(f, "arun"),
            Self::Run { command } => write!(f, "arun_{command}"),
            Self::Delete { command } => write!(f, "adelete_{command}"),
            Self::Fetch { command } => write!(f, "afetch_{command}"),
            Self::Save { command } => write!(f, "asave_{command}"),
            Self::Iterate { command } => write!(f, "aiterate_{command}"),
            Self::Simple(method) => write!(f, "a{}", method.name()),
            Self::RunWrap(method) => write!(f, "a{}", method.name()),
        }
    }
}
