//! Command Module
//!
//! Routes a verb to its handler, checks arity, runs the handler against the
//! key space and returns the reply `Value`. Nothing here knows about sockets
//! or wire bytes.
//!
//! ## Commands
//! - generic: PING, COMMAND
//! - strings: SET, GET, MSET, MGET
//! - keys:    DEL, EXISTS
//! - hashes:  HSET, HGET, HDEL, HEXISTS

mod generic;
mod hashes;
mod keys;
mod strings;

use std::collections::HashMap;

use bytes::Bytes;

use crate::keyspace::KeySpace;
use crate::protocol::{Request, Value};

/// A command implementation; arity is already checked when it runs
pub type Handler = fn(&KeySpace, &[Bytes]) -> Value;

/// Accepted argument counts (verb excluded)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Arity {
    /// Exactly `n` arguments
    Exact(usize),

    /// Between `min` and `max` arguments, inclusive
    Range(usize, usize),

    /// At least `n` arguments
    AtLeast(usize),

    /// `after` leading arguments followed by one or more (name, value) pairs
    Pairs { after: usize },

    /// Anything
    Any,
}

impl Arity {
    pub fn accepts(&self, n: usize) -> bool {
        match *self {
            Arity::Exact(exact) => n == exact,
            Arity::Range(min, max) => (min..=max).contains(&n),
            Arity::AtLeast(min) => n >= min,
            Arity::Pairs { after } => n > after && (n - after) % 2 == 0,
            Arity::Any => true,
        }
    }
}

/// One entry of the dispatch table
#[derive(Clone, Copy)]
pub struct CommandSpec {
    /// Lower-case name used in error replies
    pub name: &'static str,
    pub arity: Arity,
    pub handler: Handler,
}

/// Verb → command dispatch table
pub struct CommandTable {
    commands: HashMap<&'static str, CommandSpec>,
}

impl CommandTable {
    /// Table with every supported command registered
    pub fn new() -> Self {
        let mut table = Self {
            commands: HashMap::new(),
        };

        table.register("PING", "ping", Arity::Range(0, 1), generic::ping);
        table.register("COMMAND", "command", Arity::Any, generic::command);

        table.register("SET", "set", Arity::Exact(2), strings::set);
        table.register("GET", "get", Arity::Exact(1), strings::get);
        table.register("MSET", "mset", Arity::Pairs { after: 0 }, strings::mset);
        table.register("MGET", "mget", Arity::AtLeast(1), strings::mget);

        table.register("DEL", "del", Arity::AtLeast(1), keys::del);
        table.register("EXISTS", "exists", Arity::AtLeast(1), keys::exists);

        table.register("HSET", "hset", Arity::Pairs { after: 1 }, hashes::hset);
        table.register("HGET", "hget", Arity::Exact(2), hashes::hget);
        table.register("HDEL", "hdel", Arity::AtLeast(2), hashes::hdel);
        table.register("HEXISTS", "hexists", Arity::Exact(2), hashes::hexists);

        table
    }

    fn register(&mut self, verb: &'static str, name: &'static str, arity: Arity, handler: Handler) {
        self.commands.insert(
            verb,
            CommandSpec {
                name,
                arity,
                handler,
            },
        );
    }

    /// Look up an upper-cased verb
    pub fn lookup(&self, verb: &str) -> Option<&CommandSpec> {
        self.commands.get(verb)
    }

    /// Registered verbs, sorted
    pub fn verbs(&self) -> Vec<&'static str> {
        let mut verbs: Vec<_> = self.commands.keys().copied().collect();
        verbs.sort_unstable();
        verbs
    }

    /// Run a request against the key space
    pub fn dispatch(&self, keyspace: &KeySpace, request: &Request) -> Value {
        let verb = request.verb_upper();

        let spec = match self.lookup(&verb) {
            Some(spec) => spec,
            None => {
                return Value::error(format!(
                    "ERR unknown command '{}'",
                    String::from_utf8_lossy(&request.verb)
                ))
            }
        };

        if !spec.arity.accepts(request.args.len()) {
            return wrong_arity(spec.name);
        }

        (spec.handler)(keyspace, &request.args)
    }
}

impl Default for CommandTable {
    fn default() -> Self {
        Self::new()
    }
}

fn wrong_arity(name: &str) -> Value {
    Value::error(format!(
        "ERR wrong number of arguments for '{}' command",
        name
    ))
}
