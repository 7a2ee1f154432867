mod collection;

pub use collection::{collect, CollectionReport, CollectionSystem};
