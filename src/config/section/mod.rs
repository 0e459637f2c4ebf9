//! Configuration section definitions.
//!
//! Each module corresponds to a section in `sitesmith.toml`:
//!
//! | Module    | TOML Section  | Purpose                               |
//! |-----------|---------------|---------------------------------------|
//! | `serve`   | `[serve]`     | HTTP server                           |
//! | `llm`     | `[llm]`       | Model endpoint and sampling           |
//! | `assets`  | `[assets]`    | Upload dir, image heuristics          |
//! | `archive` | `[archive]`   | Retention of generated websites       |

mod archive;
mod assets;
mod llm;
mod serve;

pub use archive::ArchiveConfig;
pub use assets::{AssetsConfig, DEFAULT_IMAGE_EXTENSIONS, DEFAULT_IMAGE_KEYWORDS};
pub use llm::LlmConfig;
pub use serve::ServeConfig;
