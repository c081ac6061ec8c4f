use crate::error::Result;
use std::io::Write;

/// A configuration the simulation engine can read from a file.
///
/// The runner only needs the serialized text; what the configuration holds
/// and whether it makes sense to the engine is up to the implementor.
pub trait ConfigExport {
    /// Write the textual form of this configuration to `writer`.
    fn export_to(&self, writer: &mut dyn Write) -> Result<()>;
}

impl<T: ConfigExport + ?Sized> ConfigExport for &T {
    fn export_to(&self, writer: &mut dyn Write) -> Result<()> {
        (**self).export_to(writer)
    }
}

impl<T: ConfigExport + ?Sized> ConfigExport for Box<T> {
    fn export_to(&self, writer: &mut dyn Write) -> Result<()> {
        (**self).export_to(writer)
    }
}

/// Raw configuration text, written out as-is
impl ConfigExport for str {
    fn export_to(&self, writer: &mut dyn Write) -> Result<()> {
        writer.write_all(self.as_bytes())?;
        Ok(())
    }
}

impl ConfigExport for String {
    fn export_to(&self, writer: &mut dyn Write) -> Result<()> {
        self.as_str().export_to(writer)
    }
}
