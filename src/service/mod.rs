//! Access to the hosted media API.
//!
//! - **Backend**: [`MediaService`] trait + error types
//! - **Parameters**: [`ListQuery`] and [`FetchParams`]
//! - **Cloudinary**: [`CloudinaryService`], the blocking HTTP implementation

pub mod backend;
pub mod cloudinary;
mod params;

pub use backend::{FetchError, MediaService, ServiceError};
pub use cloudinary::{CloudinaryService, Credentials, parse_search_response};
pub use params::{FetchParams, ListQuery, SortDirection};
