pub mod classify;
pub mod discovery;
pub mod error;
pub mod fingerprint;
pub mod fragment;
pub mod markup;
pub mod result;
pub mod runtime;
pub mod scanner;

pub use classify::{Category, classify};
pub use discovery::{DiscoveredFiles, SourceFile, SourceKind, discover};
pub use error::ScanError;
pub use fingerprint::{Admission, DedupIndex, Fingerprint};
pub use fragment::{Fragment, FragmentOrigin};
pub use markup::{Document, Element, MarkupNode};
pub use result::AcceptedElement;
pub use runtime::{ExecutionOutcome, PageRuntime};
pub use scanner::{Candidate, scan};
