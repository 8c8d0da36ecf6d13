use serde::Serialize;

// 业务错误码
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[repr(i32)]
pub enum ErrorCode {
    Success = 0,

    // 通用错误
    BadRequest = 1000,
    Unauthorized = 1001,
    Forbidden = 1003,
    NotFound = 1004,
    InternalServerError = 1005,
    PayloadTooLarge = 1006,

    // 认证
    AuthFailed = 2000,
    SessionExpired = 2001,

    // 资料
    MaterialUploadFailed = 3000,
    FileNotFound = 3001,
    FileSizeExceeded = 3002,
    MultifileUploadNotAllowed = 3003,
    MaterialInvalid = 3004,

    // 日程
    EventInvalid = 4000,
    EventCreationFailed = 4001,

    // 聊天
    ChatMessageEmpty = 5000,
    ChatSendFailed = 5001,
    RealtimeUnavailable = 5002,

    // 学生
    StudentInvalid = 6000,
    StudentNotFound = 6001,
    StudentSaveFailed = 6002,

    // 界面外壳
    ShellNotFound = 7000,
}
