pub mod cookies;
pub mod hashtag;
pub mod pagination;
pub mod response;
pub mod sanitize;
pub mod validation;
