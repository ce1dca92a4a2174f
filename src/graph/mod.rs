pub mod animation;
pub mod graph_edge;
pub mod graph_node;
pub mod graph_view;
pub mod projection;
pub mod style;
pub mod viewport;
