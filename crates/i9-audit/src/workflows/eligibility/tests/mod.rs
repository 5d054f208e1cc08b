mod common;
mod grouping;
mod review;
mod rubric;
mod service;
