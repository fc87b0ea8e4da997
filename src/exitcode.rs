//! Process exit codes, numbered after BSD sysexits.h.
//!
//! `cli::error` maps each error layer onto one of these.

/// Bad flags, missing subcommand, or `config init` over an existing file
pub const USAGE: i32 = 64;

/// Request rejected: malformed JSON, broken hierarchy, strict duplicate names
pub const DATAERR: i32 = 65;

/// Request document not found
pub const NOINPUT: i32 = 66;

/// Executor fault or planned and realized counts disagree
pub const SOFTWARE: i32 = 70;

/// Reading the request or writing the response failed
pub const IOERR: i32 = 74;

/// Unreadable settings file or environment override
pub const CONFIG: i32 = 78;
