/**
 * Procedural resources. Nothing is loaded from disk: every raster the studio
 * samples is painted here at build time.
 */
pub mod canvas;
pub mod tread;
