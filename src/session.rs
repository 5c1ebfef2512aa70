use skia_safe::{AlphaType, ColorType, ImageInfo, Surface};

use crate::config::Config;
use crate::error::LoadError;
use crate::fields::FieldRegistry;
use crate::metadata::BoundingBox;
use crate::overlay;
use crate::render;
use crate::viewport::ViewportTransform;
use crate::worker::{FetchRequest, FetchResult, FetchWorker, FetchedDocument};

/// Everything one successful load cycle produced: the composited raster
/// (page + overlays), the boxes in server order, the transform that mapped
/// them, and the field registry they join to. Bundled so geometry from two
/// different cycles can never be mixed.
pub struct PageView {
    pub boxes: Vec<BoundingBox>,
    pub transform: ViewportTransform,
    pub surface: Surface,
    pub fields: FieldRegistry,
}

impl PageView {
    /// Snapshot the composited surface as RGBA pixels.
    pub fn pixels_rgba(&mut self) -> anyhow::Result<Vec<u8>> {
        let (w, h) = (self.surface.width(), self.surface.height());
        let info = ImageInfo::new((w, h), ColorType::RGBA8888, AlphaType::Unpremul, None);
        let mut pixels = vec![0u8; (w * h * 4) as usize];
        if !self.surface.read_pixels(&info, &mut pixels, w as usize * 4, (0, 0)) {
            anyhow::bail!("could not read raster surface pixels");
        }
        Ok(pixels)
    }

    /// Write the composited page + overlays to a PNG file.
    pub fn write_png(&mut self, path: &std::path::Path) -> anyhow::Result<()> {
        let (w, h) = (self.surface.width() as u32, self.surface.height() as u32);
        let pixels = self.pixels_rgba()?;

        let file = std::fs::File::create(path)?;
        let mut encoder = png::Encoder::new(std::io::BufWriter::new(file), w, h);
        encoder.set_color(png::ColorType::Rgba);
        encoder.set_depth(png::BitDepth::Eight);
        let mut writer = encoder.write_header()?;
        writer.write_image_data(&pixels)?;
        Ok(())
    }
}

/// Lifecycle of the displayed document. Exactly one state holds at any
/// time; `Failed` is terminal for its cycle and only an identifier change
/// starts a new one.
pub enum LoadState {
    Idle,
    Loading,
    Ready(PageView),
    Failed(LoadError),
}

impl LoadState {
    pub fn is_loading(&self) -> bool {
        matches!(self, LoadState::Loading)
    }

    pub fn is_ready(&self) -> bool {
        matches!(self, LoadState::Ready(_))
    }
}

/// Drives load cycles for whatever document identifier the caller supplies,
/// and owns the page state the click handler reads. All mutation happens on
/// the caller's thread; the fetch worker only ever hands back tagged results.
pub struct DocumentSession {
    config: Config,
    doc_ref: Option<String>,
    /// Bumped on every accepted identifier change. Worker results carry the
    /// generation captured at submit time; anything older is discarded.
    generation: u64,
    state: LoadState,
    worker: Option<FetchWorker>,
}

impl DocumentSession {
    pub fn new(config: Config) -> Self {
        Self {
            config,
            doc_ref: None,
            generation: 0,
            state: LoadState::Idle,
            worker: None,
        }
    }

    pub fn state(&self) -> &LoadState {
        &self.state
    }

    pub fn document(&self) -> Option<&str> {
        self.doc_ref.as_deref()
    }

    pub fn view(&self) -> Option<&PageView> {
        match &self.state {
            LoadState::Ready(view) => Some(view),
            _ => None,
        }
    }

    pub fn view_mut(&mut self) -> Option<&mut PageView> {
        match &mut self.state {
            LoadState::Ready(view) => Some(view),
            _ => None,
        }
    }

    /// React to the surrounding context supplying a document identifier.
    /// The same identifier again is a no-op; a different one drops the
    /// current page state synchronously, enters `Loading`, and submits a
    /// fetch tagged with the new generation. A misconfigured API base fails
    /// the cycle here, before any network activity.
    pub fn set_document(&mut self, doc_ref: &str) {
        if self.doc_ref.as_deref() == Some(doc_ref) {
            return;
        }

        log::info!("Loading document {}", doc_ref);
        self.doc_ref = Some(doc_ref.to_string());
        self.generation += 1;
        self.state = LoadState::Loading;

        if let Err(e) = self.config.validate() {
            log::error!("{}", e);
            self.state = LoadState::Failed(e);
            return;
        }

        let request = FetchRequest {
            generation: self.generation,
            doc_ref: doc_ref.to_string(),
            config: self.config.clone(),
        };
        self.worker
            .get_or_insert_with(FetchWorker::new)
            .submit(request);
    }

    /// Drain one completed fetch, if any, and commit it. Returns true when
    /// the state changed.
    pub fn poll(&mut self) -> bool {
        let result = match self.worker.as_mut().and_then(|w| w.poll()) {
            Some(result) => result,
            None => return false,
        };
        self.commit(result)
    }

    fn commit(&mut self, result: FetchResult) -> bool {
        if result.generation != self.generation {
            log::info!(
                "Discarding stale result for {} (generation {}, current {})",
                result.doc_ref,
                result.generation,
                self.generation
            );
            return false;
        }

        self.state = match result.outcome.and_then(build_view) {
            Ok(view) => {
                log::info!(
                    "Document {} ready ({} boxes, {}x{})",
                    result.doc_ref,
                    view.boxes.len(),
                    view.transform.width,
                    view.transform.height
                );
                LoadState::Ready(view)
            }
            Err(e) => {
                log::error!("Load failed for {}: {}", result.doc_ref, e);
                LoadState::Failed(e)
            }
        };
        true
    }

    /// Resolve a screen-space click against the current page. On a hit the
    /// owning box's field is focused and its input identifier returned;
    /// anything else (no page, miss, unknown field) is None.
    pub fn handle_click(&mut self, x: f32, y: f32) -> Option<String> {
        let view = match &mut self.state {
            LoadState::Ready(view) => view,
            _ => return None,
        };

        let element_id = overlay::hit_test(&view.boxes, &view.transform, x, y)?.to_string();
        view.fields.focus(&element_id).map(|f| f.input_id.clone())
    }
}

/// UI-thread half of a commit: decode + rasterize the page, stroke the
/// overlays, build the field registry.
fn build_view(fetched: FetchedDocument) -> Result<PageView, LoadError> {
    let (mut surface, transform) = render::render_page(&fetched.pdf_bytes)?;
    overlay::draw_overlays(surface.canvas(), &fetched.meta.boxes, &transform);
    let fields = FieldRegistry::from_boxes(&fetched.meta.boxes);

    Ok(PageView {
        boxes: fetched.meta.boxes,
        transform,
        surface,
        fields,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metadata::parse_metadata;
    use crate::render::minimal_pdf;

    fn configured() -> Config {
        Config {
            // Unroutable but well-formed; tests never wait on the socket.
            api_base: "http://127.0.0.1:1/api".to_string(),
            ..Config::default()
        }
    }

    fn fetched_scenario_a() -> FetchedDocument {
        let meta = parse_metadata(
            r#"{
                "cloudStoragePath": "https://x/doc.pdf",
                "boundingBoxes": [
                    {"element_id": "box1", "x": 50, "y": 100, "width": 150, "height": 30, "text": "T1"}
                ]
            }"#,
        )
        .unwrap();
        FetchedDocument {
            meta,
            pdf_bytes: minimal_pdf(612.0, 792.0),
        }
    }

    fn result(generation: u64, outcome: Result<FetchedDocument, LoadError>) -> FetchResult {
        FetchResult {
            generation,
            doc_ref: "test".to_string(),
            outcome,
        }
    }

    #[test]
    fn starts_idle_until_an_identifier_arrives() {
        let session = DocumentSession::new(configured());
        assert!(matches!(session.state(), LoadState::Idle));
        assert!(session.document().is_none());
    }

    #[test]
    fn placeholder_config_fails_before_any_network_activity() {
        let mut session = DocumentSession::new(Config::default());
        session.set_document("doc1");

        assert!(matches!(session.state(), LoadState::Failed(LoadError::Config(_))));
        assert!(session.worker.is_none(), "no fetch worker may be spawned");
    }

    #[test]
    fn same_identifier_is_a_no_op() {
        let mut session = DocumentSession::new(configured());
        session.set_document("doc1");
        let generation = session.generation;

        session.set_document("doc1");
        assert_eq!(session.generation, generation);
        assert!(session.state().is_loading());
    }

    #[test]
    fn successful_cycle_reaches_ready_with_bound_fields() {
        let mut session = DocumentSession::new(configured());
        session.set_document("doc1");

        assert!(session.commit(result(session.generation, Ok(fetched_scenario_a()))));

        let view = session.view().expect("ready view");
        assert_eq!(view.transform.scale, 1.5);
        assert_eq!(view.fields.fields()[0].input_id, "input-box1");
        assert_eq!(view.fields.fields()[0].text, "T1");
    }

    #[test]
    fn click_inside_a_box_focuses_its_field() {
        let mut session = DocumentSession::new(configured());
        session.set_document("doc1");
        session.commit(result(session.generation, Ok(fetched_scenario_a())));

        let focused = session.handle_click(50.0 * 1.5 + 5.0, 100.0 * 1.5 + 5.0);
        assert_eq!(focused.as_deref(), Some("input-box1"));
        assert_eq!(
            session.view().unwrap().fields.focused().unwrap().element_id,
            "box1"
        );

        // A miss resolves to nothing and leaves focus alone.
        assert_eq!(session.handle_click(1.0, 1.0), None);
        assert_eq!(
            session.view().unwrap().fields.focused().unwrap().element_id,
            "box1"
        );
    }

    #[test]
    fn clicks_are_ignored_while_not_ready() {
        let mut session = DocumentSession::new(configured());
        assert_eq!(session.handle_click(10.0, 10.0), None);

        session.set_document("doc1");
        assert_eq!(session.handle_click(10.0, 10.0), None);
    }

    #[test]
    fn stale_generations_never_commit() {
        let mut session = DocumentSession::new(configured());
        session.set_document("doc1");
        let stale = session.generation;
        session.set_document("doc2");

        // Late results from doc1's cycle, success or failure, are discarded.
        assert!(!session.commit(result(stale, Ok(fetched_scenario_a()))));
        assert!(session.state().is_loading());
        assert!(!session.commit(result(stale, Err(LoadError::Fetch("late".into())))));
        assert!(session.state().is_loading());

        // The current cycle still commits normally.
        assert!(session.commit(result(session.generation, Ok(fetched_scenario_a()))));
        assert!(session.state().is_ready());
    }

    #[test]
    fn failed_cycle_clears_the_page() {
        let mut session = DocumentSession::new(configured());
        session.set_document("doc1");
        session.commit(result(session.generation, Ok(fetched_scenario_a())));
        assert!(session.state().is_ready());

        session.set_document("doc2");
        session.commit(result(
            session.generation,
            Err(LoadError::Validation("response has no cloudStoragePath".into())),
        ));

        assert!(matches!(session.state(), LoadState::Failed(LoadError::Validation(_))));
        assert!(session.view().is_none(), "boxes and surface are gone");
    }

    #[test]
    fn undecodable_document_fails_the_render_step() {
        let mut session = DocumentSession::new(configured());
        session.set_document("doc1");

        let meta = parse_metadata(r#"{"cloudStoragePath": "https://x/doc.pdf"}"#).unwrap();
        session.commit(result(
            session.generation,
            Ok(FetchedDocument {
                meta,
                pdf_bytes: b"not a pdf".to_vec(),
            }),
        ));

        assert!(matches!(session.state(), LoadState::Failed(LoadError::Render(_))));
    }

    #[test]
    fn identifier_change_clears_synchronously_before_the_new_fetch() {
        let mut session = DocumentSession::new(configured());
        session.set_document("doc1");
        session.commit(result(session.generation, Ok(fetched_scenario_a())));
        assert!(session.state().is_ready());

        // The moment doc2 is observed, doc1's surface and boxes are gone,
        // with doc2's fetch still unresolved.
        session.set_document("doc2");
        assert!(session.state().is_loading());
        assert!(session.view().is_none());
    }
}
