// Filesystem facade and the capability providers behind it
//
// The facade forwards typed calls to a provider; the providers here cover
// the local filesystem, scoped document access and a slow test decorator.

pub mod codec;
pub mod facade;
pub mod local;
pub mod provider;
pub mod scoped;
pub mod slow;

pub use facade::{FileSystem, ScopedStorage, LINKING_ERROR};
pub use local::LocalFsProvider;
pub use provider::{DocumentPicker, FsProvider, ScopedStorageProvider};
pub use scoped::{GrantStore, LocalScopedStorage, PresetPicker};
pub use slow::{ProviderMetrics, SlowFsConfig, SlowFsProvider};
