use axum::body::{to_bytes, Body};
use axum::http::{Request, StatusCode};
use axum::middleware::Next;
use axum::response::Response;
use chrono::Local;

/// Middleware для логирования HTTP запросов
///
/// Выводит в консоль локальное время, длительность, размер ответа, статус,
/// метод и путь. Ответы с ошибкой дополнительно уходят в tracing.
pub async fn request_logger(req: Request<Body>, next: Next) -> Response {
    let start = std::time::Instant::now();
    let method = req.method().clone();
    let path = req.uri().path().to_string();

    let response = next.run(req).await;
    let (parts, body) = response.into_parts();

    // Читаем тело ответа, чтобы узнать реальный размер
    let bytes = match to_bytes(body, usize::MAX).await {
        Ok(b) => b,
        Err(e) => {
            tracing::warn!("{} {}: failed to read response body: {}", method, path, e);
            print_line(parts.status, start.elapsed().as_millis(), "error", &method, &path);
            return Response::from_parts(parts, Body::default());
        }
    };

    let elapsed = start.elapsed().as_millis();
    print_line(
        parts.status,
        elapsed,
        &format_number(bytes.len()),
        &method,
        &path,
    );
    if parts.status.is_server_error() {
        tracing::error!("{} {} -> {} ({}ms)", method, path, parts.status, elapsed);
    }

    // Создаем новый ответ с прочитанным телом
    Response::from_parts(parts, Body::from(bytes))
}

fn print_line(status: StatusCode, elapsed_ms: u128, size: &str, method: &axum::http::Method, path: &str) {
    // Голубой для 2xx, коричневый для остальных
    let color_code = if status.is_success() { "36" } else { "33" };

    println!(
        "\x1b[{}m{}\x1b[0m | {:>5}ms | {:>12} | {} {:>6} {}",
        color_code,
        Local::now().format("%H:%M:%S"),
        elapsed_ms,
        size,
        status.as_u16(),
        method,
        path
    );
}

/// Форматирует число с разделителями тысяч (точками)
fn format_number(n: usize) -> String {
    let s = n.to_string();
    let mut result = String::new();
    for (i, ch) in s.chars().rev().enumerate() {
        if i > 0 && i % 3 == 0 {
            result.push('.');
        }
        result.push(ch);
    }
    result.chars().rev().collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_number() {
        assert_eq!(format_number(0), "0");
        assert_eq!(format_number(999), "999");
        assert_eq!(format_number(1000), "1.000");
        assert_eq!(format_number(1234567), "1.234.567");
    }
}
