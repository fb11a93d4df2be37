use thiserror::Error;

#[derive(Error, Debug)]
pub enum WorkflowError {
    #[error("model step failed: {0}")]
    Invoke(#[from] promptweave_client::InvokeError),

    #[error("booking store error: {0}")]
    Store(#[from] promptweave_store::StoreError),

    #[error("failed to read interactive input: {0}")]
    Input(#[from] std::io::Error),

    #[error("no departure date found after one additional prompt")]
    MissingDepartureDate,

    #[error("ticket id is not a number: {0:?}")]
    InvalidTicketId(String),
}
