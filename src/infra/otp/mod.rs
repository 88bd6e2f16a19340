pub mod http_otp_service;
