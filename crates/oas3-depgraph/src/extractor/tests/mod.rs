mod support;

mod analytics;
mod graph_builder;
mod roots;
