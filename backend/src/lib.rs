//! Sign in to Microsoft Graph and page through a response.

pub mod api;
pub mod graph;
pub mod pages;
pub mod static_files;

#[cfg(test)]
pub mod test;
