pub mod mermaid;

pub use mermaid::MermaidRenderer;
