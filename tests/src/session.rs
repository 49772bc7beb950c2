mod cancellation;
mod lifecycle;
