pub mod compression;
pub mod models;
pub mod normalize;
pub mod text;

// 重新导出常用模块和函数，方便直接使用
pub use compression::{from_compressed, to_compressed, validate_compressed_data, CodecError};
pub use models::{Article, ArticleId, ArticleTag, AuthorId, Category, CategoryId, SnapshotMetadata, Tag, TagId};
pub use normalize::{fold, normalize};
pub use text::plain_text;
