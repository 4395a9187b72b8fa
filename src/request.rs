use crate::{
    error::{QRError, QRResult},
    metadata::{ECLevel, Mode, Version},
};

pub const DEFAULT_SCALE: u32 = 5;

/// One generation job. `None` options are chosen automatically by the encoder.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Request {
    text: String,
    ec_level: Option<ECLevel>,
    version: Option<Version>,
    mode: Option<Mode>,
    scale: u32,
}

impl Request {
    pub fn builder(text: impl Into<String>) -> RequestBuilder {
        RequestBuilder::new(text)
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn ec_level(&self) -> Option<ECLevel> {
        self.ec_level
    }

    pub fn version(&self) -> Option<Version> {
        self.version
    }

    pub fn mode(&self) -> Option<Mode> {
        self.mode
    }

    pub fn scale(&self) -> u32 {
        self.scale
    }

    /// Copies the options into a new builder, for callers that edit one field
    /// and resubmit.
    pub fn to_builder(&self) -> RequestBuilder {
        RequestBuilder {
            text: self.text.clone(),
            ec_level: self.ec_level,
            version: self.version,
            mode: self.mode,
            scale: self.scale,
        }
    }

    pub fn metadata(&self) -> String {
        fn auto<T: std::fmt::Debug>(v: Option<T>) -> String {
            v.map_or_else(|| "Auto".to_string(), |v| format!("{v:?}"))
        }
        format!(
            "{{ Version: {}, Ec level: {}, Mode: {}, Scale: {} }}",
            self.version.map_or_else(|| "Auto".to_string(), |v| v.to_string()),
            auto(self.ec_level),
            auto(self.mode),
            self.scale
        )
    }
}

impl Default for Request {
    fn default() -> Self {
        Self { text: String::new(), ec_level: None, version: None, mode: None, scale: DEFAULT_SCALE }
    }
}

// Builder
//------------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct RequestBuilder {
    text: String,
    ec_level: Option<ECLevel>,
    version: Option<Version>,
    mode: Option<Mode>,
    scale: u32,
}

impl RequestBuilder {
    pub fn new(text: impl Into<String>) -> Self {
        Self { text: text.into(), ec_level: None, version: None, mode: None, scale: DEFAULT_SCALE }
    }

    pub fn text(&mut self, text: impl Into<String>) -> &mut Self {
        self.text = text.into();
        self
    }

    pub fn ec_level(&mut self, ec_level: ECLevel) -> &mut Self {
        self.ec_level = Some(ec_level);
        self
    }

    pub fn unset_ec_level(&mut self) -> &mut Self {
        self.ec_level = None;
        self
    }

    pub fn version(&mut self, version: Version) -> &mut Self {
        self.version = Some(version);
        self
    }

    pub fn unset_version(&mut self) -> &mut Self {
        self.version = None;
        self
    }

    pub fn mode(&mut self, mode: Mode) -> &mut Self {
        self.mode = Some(mode);
        self
    }

    pub fn unset_mode(&mut self) -> &mut Self {
        self.mode = None;
        self
    }

    /// Sets every optional field at once, `None` meaning automatic.
    pub fn options(
        &mut self,
        ec_level: Option<ECLevel>,
        version: Option<Version>,
        mode: Option<Mode>,
    ) -> &mut Self {
        self.ec_level = ec_level;
        self.version = version;
        self.mode = mode;
        self
    }

    pub fn scale(&mut self, scale: u32) -> &mut Self {
        self.scale = scale;
        self
    }

    pub fn build(&self) -> QRResult<Request> {
        if self.scale == 0 {
            return Err(QRError::InvalidScale(self.scale));
        }
        Ok(Request {
            text: self.text.clone(),
            ec_level: self.ec_level,
            version: self.version,
            mode: self.mode,
            scale: self.scale,
        })
    }
}
