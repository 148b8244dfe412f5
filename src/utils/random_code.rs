use rand::Rng;

const PASSWORD_CHARSET: &[u8] =
    b"ABCDEFGHJKLMNPQRSTUVWXYZabcdefghijkmnopqrstuvwxyz23456789!@#$%";

/// 生成随机密码，保证同时包含大小写字母和数字
pub fn generate_random_password(length: usize) -> String {
    let length = length.max(8);
    let mut rng = rand::rng();

    let mut password: Vec<char> = vec![
        (b'A' + rng.random_range(0..26)) as char,
        (b'a' + rng.random_range(0..26)) as char,
        (b'0' + rng.random_range(0..10)) as char,
    ];
    password.extend((password.len()..length).map(|_| {
        let idx = rng.random_range(0..PASSWORD_CHARSET.len());
        PASSWORD_CHARSET[idx] as char
    }));

    // 打乱前三个固定位置
    for i in (1..password.len()).rev() {
        let j = rng.random_range(0..=i);
        password.swap(i, j);
    }

    password.into_iter().collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::validate::validate_password;

    #[test]
    fn test_generated_password_passes_policy() {
        for _ in 0..20 {
            let password = generate_random_password(16);
            assert_eq!(password.chars().count(), 16);
            assert!(validate_password(&password).is_valid, "{password}");
        }
    }
}
