//! Plain data models of the sample application.

mod article;
mod person;

pub use article::Article;
pub use person::Person;
