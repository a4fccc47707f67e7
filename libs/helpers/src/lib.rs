pub mod documents;
pub mod oracle;
