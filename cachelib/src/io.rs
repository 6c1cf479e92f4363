use std::fs::File;
use std::ops::Deref;

/// A trace file loaded for simulation, memory mapped where the platform allows it
pub enum TraceBytes {
    #[cfg(unix)]
    Mapped(memmap2::Mmap),
    Buffered(Vec<u8>),
}

impl Deref for TraceBytes {
    type Target = [u8];

    fn deref(&self) -> &Self::Target {
        match self {
            #[cfg(unix)]
            TraceBytes::Mapped(m) => m,
            TraceBytes::Buffered(b) => b,
        }
    }
}

pub fn load_trace(file: File) -> Result<TraceBytes, String> {
    let len = file.metadata().map_err(|e| format!("Couldn't read the trace file metadata: {e}"))?.len();
    // Mapping an empty file fails on some platforms, and there is nothing to gain from it
    if len == 0 {
        return Ok(TraceBytes::Buffered(Vec::new()));
    }
    // Memory map the file for speed on unix systems
    #[cfg(unix)]
    {
        use memmap2::{Advice, Mmap};
        // The simulator reads the trace strictly front to back
        unsafe {
            let m = Mmap::map(&file).map_err(|e| format!("Couldn't memory map the file: {e}"))?;
            m.advise(Advice::Sequential).map_err(|e| format!("Failed to provide access advice to the OS, {e}"))?;
            Ok(TraceBytes::Mapped(m))
        }
    }
    // Compatibility on other systems
    #[cfg(not(unix))]
    {
        use std::io::Read;
        let mut file = file;
        let mut buf = Vec::with_capacity(len as usize);
        file.read_to_end(&mut buf).map_err(|e| format!("Couldn't read the trace file: {e}"))?;
        Ok(TraceBytes::Buffered(buf))
    }
}
