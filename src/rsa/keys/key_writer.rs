use std::io::Write;
use crate::rsa::error::Result;
use crate::rsa::keys::{BASE64_SPLIT, Key};

/// Writes a key as `-----BEGIN <label>-----`, wrapped base64 lines, `-----END <label>-----`.
pub struct KeyWriter<W: Write> {
    writer: W,
    pub header: String,
    pub footer: String,
}

impl<W: Write> KeyWriter<W> {
    pub fn new(writer: W) -> Self {
        KeyWriter {
            writer,
            header: "".to_string(),
            footer: "".to_string(),
        }
    }

    pub fn with_label(writer: W, label: &str) -> Self {
        let mut s = Self::new(writer);
        s.header = format!("-----BEGIN {}-----", label.to_uppercase());
        s.footer = format!("-----END {}-----", label.to_uppercase());
        s
    }

    pub fn write_key(&mut self, key: &Key) -> Result<()> {
        let encoded = base64::encode(key.payload().as_bytes());
        self.writer.write_all(self.header.as_bytes())?;
        self.writer.write_all(b"\n")?;
        for line in encoded.as_bytes().chunks(BASE64_SPLIT) {
            self.writer.write_all(line)?;
            self.writer.write_all(b"\n")?;
        }
        self.writer.write_all(self.footer.as_bytes())?;
        self.writer.write_all(b"\n")?;
        self.writer.flush()?;
        Ok(())
    }

    pub fn into_inner(self) -> W {
        self.writer
    }
}

/// Armored text for `key` under `label`.
pub fn encode_key(label: &str, key: &Key) -> Result<String> {
    let mut writer = KeyWriter::with_label(Vec::new(), label);
    writer.write_key(key)?;
    Ok(String::from_utf8_lossy(&writer.into_inner()).into_owned())
}
