// Scan pipeline: runs every analyzer over one snapshot.

pub mod scan;
