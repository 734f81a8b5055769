// Document generation pipeline.
// Implements: request shapes, template load → paginate → render, parsed-statement intake.
// Pagination itself lives in crate::pagination; rendering goes through crate::render.

pub mod generator;
pub mod handlers;
pub mod statement;
