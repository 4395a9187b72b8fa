use crate::{
    encode::encode,
    error::QRResult,
    render::Artifact,
    request::Request,
};

/// Turns a request into an image. Runs on the worker thread.
///
/// Errors for which [`QRError::is_validation`](crate::QRError::is_validation)
/// holds are reported as failures, anything else stops the worker.
pub trait Generator: Send + 'static {
    fn generate(&self, request: &Request) -> QRResult<Artifact>;
}

impl<F> Generator for F
where
    F: Fn(&Request) -> QRResult<Artifact> + Send + 'static,
{
    fn generate(&self, request: &Request) -> QRResult<Artifact> {
        self(request)
    }
}

/// Encodes with the `qrcode` crate and rasterizes at the request's scale.
#[derive(Debug, Default, Clone, Copy)]
pub struct QrGenerator;

impl Generator for QrGenerator {
    fn generate(&self, request: &Request) -> QRResult<Artifact> {
        let symbol = encode(request)?;
        Artifact::from_symbol(&symbol, request.scale())
    }
}
