// CV profile extraction: vocabulary scan, seniority ladder, industry
// detection, confidence. Pure text analysis; no I/O.

pub mod extractor;
pub mod handlers;
pub mod vocabulary;
