//! Wire types shared by the streaming and non-streaming endpoints.

pub mod request;
pub mod response;
pub mod source;
pub mod stream;

pub use request::*;
pub use response::*;
pub use source::*;
pub use stream::*;
