mod common;
mod subscriber;
