// Roomcast API Library
//
// HTTP/JSON REST façade over the media server's administrative API

pub mod http;

pub use http::AppState;
