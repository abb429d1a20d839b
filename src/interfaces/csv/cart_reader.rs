use crate::domain::cart::CartItem;
use crate::error::{CheckoutError, Result};
use std::io::Read;

/// Reads cart lines from a CSV source.
///
/// Expected header: `product, name, price, quantity` with optional `image`
/// and `stock` columns. Whitespace is trimmed and short records are allowed.
pub struct CartReader<R: Read> {
    reader: csv::Reader<R>,
}

impl<R: Read> CartReader<R> {
    /// Creates a new `CartReader` from any `Read` source (e.g., File, Stdin).
    pub fn new(source: R) -> Self {
        let reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .flexible(true)
            .from_reader(source);
        Self { reader }
    }

    /// Returns an iterator that lazily reads and deserializes cart lines.
    pub fn items(self) -> impl Iterator<Item = Result<CartItem>> {
        self.reader
            .into_deserialize()
            .map(|result| result.map_err(CheckoutError::from))
    }

    /// Reads every line, failing on the first malformed one.
    pub fn read_all(self) -> Result<Vec<CartItem>> {
        let items = self.items().collect::<Result<Vec<_>>>()?;
        if let Some(item) = items.iter().find(|item| item.quantity == 0) {
            return Err(CheckoutError::ValidationError(format!(
                "Product {} has quantity 0",
                item.product
            )));
        }
        Ok(items)
    }
}
