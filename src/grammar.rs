//! Sigma Format Grammar
//!
//! This module documents the Sigma wire format as implemented by this library. It
//! contains no code.
//!
//! # Overview
//!
//! Sigma is a self-describing text serialization format. A document is exactly one
//! value, encoded as UTF-8. Every value starts with a character that identifies its
//! kind, so a reader needs one character of lookahead and never backtracks.
//!
//! # Grammar
//!
//! ```text
//! value    = number / string / temporal / list / map / record / constant / binary
//! number   = [sign] 1*DIGIT ["." 1*DIGIT] [("e"/"E") [sign] 1*DIGIT]
//! string   = DQUOTE *(unescaped / "\" (DQUOTE/"\"/"n"/"r"/"t"/"u" 4HEXDIG)) DQUOTE
//! temporal = "@" (zoned-datetime / offset-datetime / offset-time / local-datetime / local-date / local-time)
//! list     = "[" [value *("," value)] "]"
//! map      = "{" [ (value "=" value) *("," value "=" value) ] "}"
//! record   = identifier "{" [ (identifier "=" value) *("," identifier "=" value) ] "}"
//! constant = "&" ("n" / "t" / "f")
//! binary   = ("|" 1*DIGIT "|" *BYTE) / ("*" *BASE64CHAR)
//! ```
//!
//! Whitespace (space, tab, CR, LF) is insignificant between tokens. The writer never
//! emits any.
//!
//! ## Dispatch
//!
//! | First character | Production |
//! |-----------------|------------|
//! | `"` | string |
//! | `[` | list |
//! | `{` | map |
//! | `+`, `-`, digit | number |
//! | `@` | temporal |
//! | `\|` | fixed-length binary |
//! | `*` | base64 binary |
//! | `&` | constant |
//! | letter, `_` | record |
//!
//! ## Tokens
//!
//! Numbers, identifiers, base64 payloads and zone names are read as tokens: a maximal
//! run of characters up to whitespace, one of `= , { } [ ]`, or end of input.
//!
//! # Numbers
//!
//! Numbers are exact decimals. The digits written are the digits read: `1.20` keeps
//! its trailing zero and `-1.23e-97` is not rounded. The writer emits the canonical
//! form, plain notation unless the value is scaled past its digits or smaller than
//! `1e-6`, in which case it uses `d.dddE±n`.
//!
//! # Strings
//!
//! | Escape | Meaning |
//! |--------|---------|
//! | `\"` | quote |
//! | `\\` | backslash |
//! | `\n` | line feed |
//! | `\r` | carriage return |
//! | `\t` | tab |
//! | `\uXXXX` | UTF-16 code unit, 4 hex digits, any case |
//!
//! A supplementary character may be written as a surrogate pair, `\uD83D\uDE00`. Any
//! other escape is an error. The writer emits control characters without a named
//! escape as `\u00XX`.
//!
//! # Temporal Values
//!
//! ```text
//! @2019-01-01                                  local date
//! @12:31:47.7                                  local time
//! @12:31:47+11:00                              offset time
//! @2019-01-01T12:31:47                         local date-time
//! @2019-01-01T12:31:47Z                        offset date-time
//! @2019-01-01T12:31:47+11:00[Australia/Hobart] zoned date-time
//! ```
//!
//! The first two digits decide the shape: followed by `:` they are an hour, otherwise
//! the start of a four-digit year. Seconds are required. Up to nine fractional digits
//! are allowed. A zone in brackets must be a known IANA zone name, and only follows
//! a date-time. Offsets range from `-12:00` to `+14:00`.
//!
//! The zone rules decide a zoned value's offset on read; the literal offset only
//! picks a side of an overlap. Where the rules give an offset with seconds, as for
//! local mean time before 1900, the writer truncates it to the minute. Values with
//! no text form, such as a five-digit year or a leap second, fail to write.
//!
//! # Binary
//!
//! `|len|` is followed by exactly `len` raw bytes, which need not be valid UTF-8.
//! `*` is followed by standard base64 without padding; `*` alone is the empty blob.
//!
//! # Records
//!
//! `point{x=1,y=2}` names a type registered with [`Types`](crate::Types). A type name
//! starts with a letter or `_` and runs to the next whitespace or separator. Type and
//! field names match case-insensitively. Fields absent from the literal keep their
//! default values.
