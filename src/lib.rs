//! callmark: find `CALL`/`NSCALL`/`MTD`/`NSMTD` markers in C sources and
//! render them as readable call signatures.
//!
//! The core is pure and stateless:
//!
//! ```
//! use callmark::{render_record, scan, Document};
//!
//! let doc = Document::from_text("CALL(Foo, obj, bar /x, y/)");
//! let records = scan(&doc);
//! assert_eq!(render_record(&records[0]), "(Foo&)obj.bar(x, y)");
//! ```

pub mod filetype;
pub mod model;
pub mod normalize;
pub mod overlay;
pub mod render;
pub mod scanner;

pub use model::{Document, MarkerKind, MatchRecord};
pub use normalize::normalize;
pub use render::render_record;
pub use scanner::scan;
