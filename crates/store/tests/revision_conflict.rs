use std::sync::Mutex;

use outline_store::{
    DocumentBackend, JsonFileBackend, MemoryBackend, NewNode, Outline, OutlineDocument,
    OutlineError, PersistError,
};
use tempfile::TempDir;

/// Wraps a shared buffer and lets another writer commit between this
/// store's load and its save.
struct RacingBackend {
    shared: MemoryBackend,
    intruder: Mutex<Option<OutlineDocument>>,
}

impl DocumentBackend for RacingBackend {
    async fn load(&self) -> Result<OutlineDocument, PersistError> {
        self.shared.load().await
    }

    async fn save(&self, document: &OutlineDocument, expected: u64) -> Result<(), PersistError> {
        let intruder = self.intruder.lock().unwrap().take();
        if let Some(other) = intruder {
            self.shared.save(&other, expected).await?;
        }
        self.shared.save(document, expected).await
    }

    fn describe(&self) -> String {
        "racing".into()
    }
}

#[tokio::test]
async fn sequential_stores_on_one_backend_see_each_other() {
    let shared = MemoryBackend::new();
    let mut first = Outline::new(shared.clone());
    let mut second = Outline::new(shared.clone());

    first.add_node("/", NewNode::volume("One")).await.unwrap();
    assert_eq!(second.add_node("/", NewNode::volume("Two")).await.unwrap(), "/v2");
    assert_eq!(first.list_volumes().await.unwrap().len(), 2);
    assert_eq!(first.document().revision, 2);
}

#[tokio::test]
async fn interleaved_write_is_detected_not_lost() {
    let shared = MemoryBackend::new();
    let mut seed = Outline::new(shared.clone());
    seed.add_node("/", NewNode::volume("Book")).await.unwrap();

    // Another writer adds /v1/a1 after we loaded revision 1.
    let mut theirs = shared.load().await.unwrap();
    theirs.insert(
        "/v1/a1",
        outline_common::types::Node::Act(outline_common::types::Entry {
            title: "Theirs".into(),
            ..Default::default()
        }),
    );
    theirs.revision += 1;

    let racing = RacingBackend { shared: shared.clone(), intruder: Mutex::new(Some(theirs)) };
    let mut ours = Outline::new(racing);
    let error = ours.add_node("/v1", NewNode::act("Ours")).await.unwrap_err();

    assert!(matches!(
        error,
        OutlineError::Persist(PersistError::Conflict { expected: 1, found: 2 })
    ));
    assert_eq!(error.code(), "PERSISTENCE_CONFLICT");
    assert!(!error.is_rejection());

    // Their write survives, ours never landed.
    let mut check = Outline::new(shared);
    assert_eq!(check.get_node("/v1/a1").await.unwrap().unwrap().title(), "Theirs");
    assert!(check.get_node("/v1/a2").await.unwrap().is_none());

    // Retrying after the conflict reloads and succeeds.
    assert_eq!(ours.add_node("/v1", NewNode::act("Ours")).await.unwrap(), "/v1/a2");
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn concurrent_file_writers_never_lose_an_acknowledged_write() {
    for round in 0..30 {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("outline.json");
        Outline::new(JsonFileBackend::new(&path))
            .add_node("/", NewNode::volume("Book"))
            .await
            .unwrap();

        let mut a = Outline::new(JsonFileBackend::new(&path));
        let mut b = Outline::new(JsonFileBackend::new(&path));
        let (ra, rb) = tokio::join!(
            a.add_node("/v1", NewNode::act("A")),
            b.add_node("/v1", NewNode::act("B")),
        );

        let mut check = Outline::new(JsonFileBackend::new(&path));
        let mut landed = 0;
        for (title, result) in [("A", ra), ("B", rb)] {
            match result {
                Ok(at) => {
                    let stored = check.get_node(&at).await.unwrap();
                    assert_eq!(
                        stored.as_ref().map(|n| n.title()),
                        Some(title),
                        "round {round}: write {title} acknowledged at {at} but not stored"
                    );
                    landed += 1;
                }
                Err(error) => assert!(
                    matches!(error, OutlineError::Persist(PersistError::Conflict { .. })),
                    "round {round}: unexpected error {error}"
                ),
            }
        }
        assert!(landed >= 1, "round {round}: one writer must win");
        assert_eq!(check.get_children("/v1").await.unwrap().len(), landed);
    }
}
