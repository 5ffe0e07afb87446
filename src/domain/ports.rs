use crate::domain::model::Arguments;
use crate::utils::error::Result;

/// Registry mapping logical names to datasets.
///
/// `register` replaces any dataset previously registered under the same name.
pub trait Catalog<D>: Send + Sync {
    fn register(&self, name: &str, dataset: D) -> Result<()>;
}

/// Backend handle passed into [`Source::consume`]. It also carries the
/// catalog that built readers publish into.
pub trait Client {
    type Dataset;

    fn catalog(&self) -> &dyn Catalog<Self::Dataset>;
}

/// Extraction backend of a reader: produce a raw dataset from a client.
pub trait Source {
    type Client: Client + ?Sized;

    fn consume(&self, client: &Self::Client) -> Result<<Self::Client as Client>::Dataset>;
}

impl<S: Source + ?Sized> Source for Box<S> {
    type Client = S::Client;

    fn consume(&self, client: &Self::Client) -> Result<<Self::Client as Client>::Dataset> {
        (**self).consume(client)
    }
}

/// A dataset that can run engine operations by name.
pub trait Transformable: Sized {
    fn transform(self, operation: &str, arguments: &Arguments) -> Result<Self>;
}
