//! 文档仓库：在文档存储之上提供书籍集合与用户资料的领域操作

pub mod collection;
pub mod profile;

pub use collection::CollectionRepository;
pub use profile::ProfileRepository;
