mod bulk;
mod concurrency;
mod properties;
mod scenario;
