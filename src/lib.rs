#![warn(
    clippy::correctness,
    clippy::suspicious,
    clippy::complexity,
    clippy::perf,
    clippy::style,
    clippy::pedantic
)]

//! Reader and writer for Windows-style `.ini` configuration files.
//!
//! ```text
//! top = 1            ; entries before any header go to the null section
//! [drivers]
//! wave = mmdrv.dll   ; inline comment
//! list = a, "b,c"    ; two values: `a` and `b,c`
//! list = d           ; appended: `a`, `b,c`, `d`
//! flag               ; an entry without values
//! ```

mod archive;
mod entry;
mod error;
mod factory;
mod parser;
mod printer;
mod section;
mod store;

pub use archive::{Archive, ArchiveConfig, SectionOrder};
pub use entry::Entry;
pub use error::{FileError, LineError, MalformedEntry, ParseError, ValueError};
pub use factory::{DefaultFactory, Factory, LowercaseFactory};
pub use section::{NULL_SECTION_NAME, Section};
pub use store::{ParameterStore, StoreCache};

/// Byte Order Mark (BOM) is used to signal the endianness of an encoding. The order `0xFF 0xFE`
/// strongly suggests that the encoding is using little-endian byte order.
///
/// <https://en.wikipedia.org/wiki/Byte_order_mark>
const BOM_UTF16_LE: &[u8] = &[0xFF, 0xFE];
const BOM_UTF8: &[u8] = &[0xEF, 0xBB, 0xBF];

/// Decodes a whole file. Windows tools commonly save `.ini` files as UTF-16 LE.
fn decode_data(data: &[u8]) -> String {
    if let Some(data) = data.strip_prefix(BOM_UTF16_LE) {
        let utf16 = data
            .chunks_exact(2)
            .map(|chunk| u16::from_le_bytes([chunk[0], chunk[1]]))
            .collect::<Vec<u16>>();

        char::decode_utf16(utf16)
            .map(|c| c.unwrap_or(char::REPLACEMENT_CHARACTER))
            .collect::<String>()
    } else {
        let data = data.strip_prefix(BOM_UTF8).unwrap_or(data);
        String::from_utf8_lossy(data).into_owned()
    }
}
