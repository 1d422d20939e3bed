pub mod pdfium;
pub mod raster;
pub mod source;

pub use pdfium::PdfBrochure;
pub use raster::{ChannelLayout, RasterImage};
pub use source::{DocumentError, DocumentSource, MockDocument, MockPage};
