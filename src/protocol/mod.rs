pub mod request;
pub mod response;

pub use request::{
    ClientInfo, GetDocumentParams, InitializeParams, JsonRpcRequest, ListCategoriesParams, RpcId,
    SearchParams, ToolCallParams,
};
pub use response::{JsonRpcError, JsonRpcResponse, ToolDescriptor, ToolResult, ToolResultContent};
