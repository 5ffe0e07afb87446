use crate::domain::model::Arguments;
use crate::domain::ports::{Client, Source, Transformable};
use crate::utils::error::Result;
use std::fmt;
use std::sync::Arc;

/// Dataset type produced by a source's client.
pub type DatasetOf<S> = <<S as Source>::Client as Client>::Dataset;

/// A pure step over a dataset. The dataset is always the first parameter;
/// the captured [`Arguments`] follow.
pub type Transformer<D> = Arc<dyn Fn(D, &Arguments) -> Result<D> + Send + Sync>;

/// Invocation record: a transformer plus the arguments it was attached with.
pub struct Transformation<D> {
    label: String,
    transformer: Transformer<D>,
    arguments: Arguments,
}

impl<D> Transformation<D> {
    pub fn new<F>(transformer: F, arguments: Arguments) -> Self
    where
        F: Fn(D, &Arguments) -> Result<D> + Send + Sync + 'static,
    {
        Self {
            label: std::any::type_name::<F>().to_string(),
            transformer: Arc::new(transformer),
            arguments,
        }
    }

    /// Step that delegates to the dataset's own named operation.
    pub fn operation(name: impl Into<String>, arguments: Arguments) -> Self
    where
        D: Transformable + 'static,
    {
        let name = name.into();
        let op = name.clone();
        Self {
            label: name,
            transformer: Arc::new(move |dataset: D, args: &Arguments| dataset.transform(&op, args)),
            arguments,
        }
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn arguments(&self) -> &Arguments {
        &self.arguments
    }

    pub fn apply(&self, dataset: D) -> Result<D> {
        (self.transformer)(dataset, &self.arguments)
    }
}

impl<D> Clone for Transformation<D> {
    fn clone(&self) -> Self {
        Self {
            label: self.label.clone(),
            transformer: Arc::clone(&self.transformer),
            arguments: self.arguments.clone(),
        }
    }
}

impl<D> fmt::Debug for Transformation<D> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Transformation")
            .field("label", &self.label)
            .field("arguments", &self.arguments)
            .finish()
    }
}

/// Extracts a dataset through its source, folds it through the attached
/// transformations and publishes the result under `id`.
///
/// Attaching is done in place: [`Reader::with_`] returns the same reader, so
/// chained and separate calls accumulate on one transformation list.
pub struct Reader<S: Source> {
    id: String,
    source: S,
    transformations: Vec<Transformation<DatasetOf<S>>>,
}

impl<S: Source> Reader<S> {
    pub fn new(id: impl Into<String>, source: S) -> Self {
        Self {
            id: id.into(),
            source,
            transformations: Vec::new(),
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    pub fn transformations(&self) -> &[Transformation<DatasetOf<S>>] {
        &self.transformations
    }

    /// Appends `transformer` with its arguments. Nothing is checked here;
    /// a bad step only fails once `build` runs it.
    pub fn with_<F>(&mut self, transformer: F, arguments: Arguments) -> &mut Self
    where
        F: Fn(DatasetOf<S>, &Arguments) -> Result<DatasetOf<S>> + Send + Sync + 'static,
    {
        self.with_transformation(Transformation::new(transformer, arguments))
    }

    /// Appends a named engine operation.
    pub fn with_operation(&mut self, name: impl Into<String>, arguments: Arguments) -> &mut Self
    where
        DatasetOf<S>: Transformable + 'static,
    {
        self.with_transformation(Transformation::operation(name, arguments))
    }

    pub fn with_transformation(&mut self, transformation: Transformation<DatasetOf<S>>) -> &mut Self {
        self.transformations.push(transformation);
        self
    }

    pub fn consume(&self, client: &S::Client) -> Result<DatasetOf<S>> {
        self.source.consume(client)
    }

    fn apply_transformations(&self, dataset: DatasetOf<S>) -> Result<DatasetOf<S>> {
        self.transformations
            .iter()
            .enumerate()
            .try_fold(dataset, |acc, (step, transformation)| {
                tracing::debug!(
                    reader = %self.id,
                    step,
                    transformer = transformation.label(),
                    "Applying transformation"
                );
                transformation.apply(acc)
            })
    }

    /// Runs extract → transform → register. The catalog is only touched
    /// after every step succeeded, so a failed build leaves `id` as it was.
    pub fn build(&self, client: &S::Client) -> Result<()> {
        tracing::debug!(reader = %self.id, "Consuming source");
        let raw = self.consume(client)?;

        let result = self.apply_transformations(raw)?;

        tracing::debug!(reader = %self.id, "Registering view");
        client.catalog().register(&self.id, result)?;

        tracing::info!(
            reader = %self.id,
            transformations = self.transformations.len(),
            "Reader built"
        );
        Ok(())
    }
}

impl<S: Source + Clone> Clone for Reader<S> {
    fn clone(&self) -> Self {
        Self {
            id: self.id.clone(),
            source: self.source.clone(),
            transformations: self.transformations.clone(),
        }
    }
}

impl<S: Source> fmt::Debug for Reader<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Reader")
            .field("id", &self.id)
            .field("transformations", &self.transformations)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ports::Catalog;
    use crate::utils::error::ReaderError;
    use serde_json::{json, Value};
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    type Steps = Vec<String>;

    #[derive(Default)]
    struct MockCatalog {
        views: Mutex<HashMap<String, Steps>>,
        fail_with: Option<String>,
    }

    impl Catalog<Steps> for MockCatalog {
        fn register(&self, name: &str, dataset: Steps) -> Result<()> {
            if let Some(message) = &self.fail_with {
                return Err(ReaderError::RegistrationError {
                    name: name.to_string(),
                    message: message.clone(),
                });
            }
            self.views.lock().unwrap().insert(name.to_string(), dataset);
            Ok(())
        }
    }

    impl MockCatalog {
        fn get(&self, name: &str) -> Option<Steps> {
            self.views.lock().unwrap().get(name).cloned()
        }
    }

    #[derive(Default)]
    struct MockClient {
        catalog: MockCatalog,
        consumed: AtomicUsize,
    }

    impl Client for MockClient {
        type Dataset = Steps;

        fn catalog(&self) -> &dyn Catalog<Steps> {
            &self.catalog
        }
    }

    struct MockSource {
        fail: bool,
    }

    impl Source for MockSource {
        type Client = MockClient;

        fn consume(&self, client: &MockClient) -> Result<Steps> {
            client.consumed.fetch_add(1, Ordering::SeqCst);
            if self.fail {
                return Err(ReaderError::ExtractionError {
                    message: "backend unreachable".to_string(),
                });
            }
            Ok(vec!["raw".to_string()])
        }
    }

    fn reader(id: &str) -> Reader<MockSource> {
        Reader::new(id, MockSource { fail: false })
    }

    fn push(label: &'static str) -> impl Fn(Steps, &Arguments) -> Result<Steps> + Send + Sync {
        move |mut steps: Steps, _args: &Arguments| {
            steps.push(label.to_string());
            Ok(steps)
        }
    }

    #[test]
    fn test_build_applies_transformations_in_attachment_order() {
        let client = MockClient::default();
        let mut r = reader("ordered");
        r.with_(push("a"), Arguments::new())
            .with_(push("b"), Arguments::new())
            .with_(push("c"), Arguments::new());

        r.build(&client).unwrap();

        assert_eq!(client.catalog.get("ordered").unwrap(), ["raw", "a", "b", "c"]);
    }

    #[test]
    fn test_chained_and_separate_calls_accumulate_identically() {
        let client = MockClient::default();

        let mut chained = reader("chained");
        chained.with_(push("f"), Arguments::new()).with_(push("g"), Arguments::new());

        let mut separate = reader("separate");
        separate.with_(push("f"), Arguments::new());
        separate.with_(push("g"), Arguments::new());

        chained.build(&client).unwrap();
        separate.build(&client).unwrap();

        assert_eq!(chained.transformations().len(), 2);
        assert_eq!(separate.transformations().len(), 2);
        assert_eq!(client.catalog.get("chained"), client.catalog.get("separate"));
    }

    #[test]
    fn test_with_returns_same_reader() {
        let mut r = reader("alias");
        let alias: *const Reader<MockSource> = r.with_(push("x"), Arguments::new());
        assert!(std::ptr::eq(alias, &r));
        assert_eq!(r.transformations().len(), 1);
    }

    #[test]
    fn test_empty_transformations_publish_raw_dataset() {
        let client = MockClient::default();
        reader("raw_only").build(&client).unwrap();
        assert_eq!(client.catalog.get("raw_only").unwrap(), ["raw"]);
    }

    #[test]
    fn test_failing_step_stops_fold_and_skips_registration() {
        let client = MockClient::default();
        client
            .catalog
            .register("guarded", vec!["previous".to_string()])
            .unwrap();

        let third_ran = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&third_ran);

        let mut r = reader("guarded");
        r.with_(push("first"), Arguments::new())
            .with_(
                |_steps: Steps, _args: &Arguments| {
                    Err(ReaderError::TransformationError {
                        message: "second step broke".to_string(),
                    })
                },
                Arguments::new(),
            )
            .with_(
                move |steps: Steps, _args: &Arguments| {
                    counter.fetch_add(1, Ordering::SeqCst);
                    Ok(steps)
                },
                Arguments::new(),
            );

        let err = r.build(&client).unwrap_err();

        assert!(matches!(
            err,
            ReaderError::TransformationError { ref message } if message == "second step broke"
        ));
        assert_eq!(third_ran.load(Ordering::SeqCst), 0);
        assert_eq!(client.catalog.get("guarded").unwrap(), ["previous"]);
    }

    #[test]
    fn test_extraction_failure_propagates_without_running_steps() {
        let client = MockClient::default();
        let ran = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&ran);

        let mut r = Reader::new("broken", MockSource { fail: true });
        r.with_(
            move |steps: Steps, _args: &Arguments| {
                counter.fetch_add(1, Ordering::SeqCst);
                Ok(steps)
            },
            Arguments::new(),
        );

        let err = r.build(&client).unwrap_err();

        assert!(matches!(err, ReaderError::ExtractionError { .. }));
        assert_eq!(ran.load(Ordering::SeqCst), 0);
        assert!(client.catalog.get("broken").is_none());
    }

    #[test]
    fn test_registration_failure_is_surfaced() {
        let client = MockClient {
            catalog: MockCatalog {
                fail_with: Some("storage offline".to_string()),
                ..Default::default()
            },
            ..Default::default()
        };

        let err = reader("unpublished").build(&client).unwrap_err();

        assert!(matches!(
            err,
            ReaderError::RegistrationError { ref name, .. } if name == "unpublished"
        ));
    }

    #[test]
    fn test_arguments_forwarded_after_dataset() {
        let client = MockClient::default();
        let seen: Arc<Mutex<Option<(Steps, Arguments)>>> = Arc::new(Mutex::new(None));
        let recorder = Arc::clone(&seen);

        let mut r = reader("forwarding");
        r.with_(
            move |steps: Steps, args: &Arguments| {
                *recorder.lock().unwrap() = Some((steps.clone(), args.clone()));
                Ok(steps)
            },
            Arguments::new().arg(1).arg(2).kwarg("key", "v"),
        );

        r.build(&client).unwrap();

        let (dataset, args) = seen.lock().unwrap().clone().unwrap();
        assert_eq!(dataset, ["raw"]);
        assert_eq!(args.args, vec![json!(1), json!(2)]);
        assert_eq!(args.kwargs.get("key"), Some(&Value::from("v")));
        assert_eq!(args.kwargs.len(), 1);
    }

    #[test]
    fn test_rebuild_reconsumes_and_registers_same_result() {
        let client = MockClient::default();
        let mut r = reader("stable");
        r.with_(push("t"), Arguments::new());

        r.build(&client).unwrap();
        let first = client.catalog.get("stable");
        r.build(&client).unwrap();

        assert_eq!(client.consumed.load(Ordering::SeqCst), 2);
        assert_eq!(client.catalog.get("stable"), first);
        assert_eq!(r.transformations().len(), 1);
    }

    #[test]
    fn test_transformation_debug_shows_arguments() {
        let t: Transformation<Steps> = Transformation::new(push("x"), Arguments::new().arg(7));
        let rendered = format!("{:?}", t);
        assert!(rendered.contains("Transformation"));
        assert!(rendered.contains('7'));
    }
}
