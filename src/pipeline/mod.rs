//! Pipeline stages for markup-preserving back-translation.
//!
//! Each submodule implements one transformation step and is testable on its
//! own; only [`client`] touches the network.
//!
//! ## Data Flow
//!
//! ```text
//! source ──▶ markup ──▶ segment ──▶ client ──▶ segment ──▶ client ──▶ cleanup
//! (file→md)  (encode)   (chunks)    (src→mid)  (chunks)    (mid→src)  (decode)
//!                       └──────────── roundtrip, once per language ────────────┘
//! ```
//!
//! 1. [`source`]: read the input file and convert it to Markdown
//! 2. [`markup`]: swap Markdown constructs for bracketed pseudo-tags that
//!    translation services leave alone
//! 3. [`segment`]: cut the text into request-sized chunks at sentence or
//!    line boundaries
//! 4. [`client`]: send one chunk through the translator with timeout and
//!    retry/backoff
//! 5. [`cleanup`]: pseudo-tags back to Markdown, then repair what the
//!    translation service broke
//! 6. [`roundtrip`]: drives 2–5 forward and back for one intermediate language

pub mod cleanup;
pub mod client;
pub mod markup;
pub mod roundtrip;
pub mod segment;
pub mod source;
