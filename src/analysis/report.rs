use anyhow::{anyhow, Context, Result};
use js_sys::{Array, Uint8Array};
use tracing::debug;
use wasm_bindgen::JsCast;
use web_sys::{Blob, BlobPropertyBag, HtmlAnchorElement, Url};

/// Hands the report bytes to the browser as a download named `filename`.
/// The object URL only lives for the duration of the click.
pub fn save_report(bytes: &[u8], filename: &str) -> Result<()> {
    let document = web_sys::window()
        .and_then(|window| window.document())
        .context("document not available")?;

    let parts = Array::of1(&Uint8Array::from(bytes));
    let options = BlobPropertyBag::new();
    options.set_type("application/pdf");
    let blob = Blob::new_with_u8_array_sequence_and_options(&parts, &options)
        .map_err(|err| anyhow!("blob creation error: {err:?}"))?;

    let url = Url::create_object_url_with_blob(&blob)
        .map_err(|err| anyhow!("object url creation error: {err:?}"))?;

    let anchor = document
        .create_element("a")
        .map_err(|err| anyhow!("{err:?}"))?
        .dyn_into::<HtmlAnchorElement>()
        .map_err(|err| anyhow!("anchor dyn conversion error: {err:?}"))?;
    anchor.set_href(&url);
    anchor.set_download(filename);
    anchor.click();

    Url::revoke_object_url(&url).map_err(|err| anyhow!("object url revocation error: {err:?}"))?;

    debug!(filename, size = bytes.len(), "report saved");

    Ok(())
}
