// ==========================================
// 课堂座位编排系统 - 配置管理器
// ==========================================
// 职责: 按班级读写编排选项, 读写全局配置
// 存储: config_kv 表 (scope_id + key + value)
// 规则: 缺失或格式错误的配置项回退默认值并记录告警
// ==========================================

use crate::config::arrange_options::ArrangeOptions;
use crate::db::open_sqlite_connection;
use crate::domain::types::{LayoutKind, PairingPolicy};
use rusqlite::{params, Connection};
use std::collections::HashMap;
use std::error::Error;
use std::sync::{Arc, Mutex};

/// 全局配置作用域
pub const GLOBAL_SCOPE: &str = "global";

// ==========================================
// ConfigManager - 配置管理器
// ==========================================
pub struct ConfigManager {
    conn: Arc<Mutex<Connection>>,
}

impl ConfigManager {
    /// 创建新的 ConfigManager 实例
    ///
    /// # 参数
    /// - db_path: 数据库文件路径
    pub fn new(db_path: &str) -> Result<Self, Box<dyn Error>> {
        let conn = open_sqlite_connection(db_path)?;
        crate::db::ensure_schema(&conn)?;

        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// 从已有连接创建 ConfigManager
    ///
    /// 说明：会对传入连接再次应用统一 PRAGMA 并确保表存在（幂等）。
    pub fn from_connection(conn: Arc<Mutex<Connection>>) -> Result<Self, Box<dyn Error>> {
        {
            let conn_guard = conn.lock().map_err(|e| format!("锁获取失败: {}", e))?;
            crate::db::configure_sqlite_connection(&conn_guard)?;
            crate::db::ensure_schema(&conn_guard)?;
        }

        Ok(Self { conn })
    }

    /// 读取配置值
    ///
    /// # 返回
    /// - Some(String): 配置值
    /// - None: 配置不存在
    pub fn get_config_value(&self, scope_id: &str, key: &str) -> Result<Option<String>, Box<dyn Error>> {
        let conn = self.conn.lock().map_err(|e| format!("锁获取失败: {}", e))?;

        let result = conn.query_row(
            "SELECT value FROM config_kv WHERE scope_id = ?1 AND key = ?2",
            params![scope_id, key],
            |row| row.get::<_, String>(0),
        );

        match result {
            Ok(value) => Ok(Some(value)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(Box::new(e)),
        }
    }

    /// 写入配置值 (UPSERT)
    pub fn set_config_value(&self, scope_id: &str, key: &str, value: &str) -> Result<(), Box<dyn Error>> {
        let conn = self.conn.lock().map_err(|e| format!("锁获取失败: {}", e))?;
        conn.execute(
            "INSERT INTO config_kv (scope_id, key, value) VALUES (?1, ?2, ?3)
             ON CONFLICT(scope_id, key) DO UPDATE SET value = ?3",
            params![scope_id, key, value],
        )?;
        Ok(())
    }

    // ===== 编排选项 (scope_id = 班级ID) =====

    /// 读取班级的编排选项
    ///
    /// 单项缺失或无法解析时使用默认值; 组合后校验不通过时整体回退默认选项。
    pub fn get_arrange_options(&self, class_id: &str) -> Result<ArrangeOptions, Box<dyn Error>> {
        let defaults = ArrangeOptions::default();
        let values = self.get_scope_values(class_id)?;

        let layout = parse_or_default(&values, config_keys::LAYOUT, defaults.layout, LayoutKind::from_str);
        let policy = parse_or_default(&values, config_keys::POLICY, defaults.policy, PairingPolicy::from_str);
        let partition_count = parse_or_default(&values, config_keys::PARTITION_COUNT, defaults.partition_count, |v| {
            v.trim().parse::<u32>().ok()
        });
        let avoid_prev_seat = parse_or_default(&values, config_keys::AVOID_PREV_SEAT, defaults.avoid_prev_seat, parse_bool);
        let avoid_prev_partner = parse_or_default(
            &values,
            config_keys::AVOID_PREV_PARTNER,
            defaults.avoid_prev_partner,
            parse_bool,
        );
        let seat_count = values
            .get(config_keys::SEAT_COUNT)
            .and_then(|v| v.trim().parse::<usize>().ok());
        let seed = values
            .get(config_keys::SEED)
            .and_then(|v| v.trim().parse::<u64>().ok());

        let options = ArrangeOptions {
            layout,
            policy,
            partition_count,
            seat_count,
            avoid_prev_seat,
            avoid_prev_partner,
            seed,
        };

        match options.validate() {
            Ok(()) => Ok(options),
            Err(e) => {
                tracing::warn!(class_id, error = %e, "班级编排选项不合法，使用默认选项");
                Ok(defaults)
            }
        }
    }

    /// 保存班级的编排选项
    ///
    /// # 返回
    /// - Ok(usize): 写入的配置项数量
    pub fn save_arrange_options(&self, class_id: &str, options: &ArrangeOptions) -> Result<usize, Box<dyn Error>> {
        let mut entries: Vec<(&str, Option<String>)> = vec![
            (config_keys::LAYOUT, Some(options.layout.to_string())),
            (config_keys::POLICY, Some(options.policy.to_string())),
            (config_keys::PARTITION_COUNT, Some(options.partition_count.to_string())),
            (config_keys::AVOID_PREV_SEAT, Some(options.avoid_prev_seat.to_string())),
            (config_keys::AVOID_PREV_PARTNER, Some(options.avoid_prev_partner.to_string())),
        ];
        entries.push((config_keys::SEAT_COUNT, options.seat_count.map(|v| v.to_string())));
        entries.push((config_keys::SEED, options.seed.map(|v| v.to_string())));

        let mut conn = self.conn.lock().map_err(|e| format!("锁获取失败: {}", e))?;
        let tx = conn.transaction()?;

        let mut count = 0;
        for (key, value) in entries {
            count += match value {
                Some(value) => tx.execute(
                    "INSERT INTO config_kv (scope_id, key, value) VALUES (?1, ?2, ?3)
                     ON CONFLICT(scope_id, key) DO UPDATE SET value = ?3",
                    params![class_id, key, value],
                )?,
                None => tx.execute(
                    "DELETE FROM config_kv WHERE scope_id = ?1 AND key = ?2",
                    params![class_id, key],
                )?,
            };
        }

        tx.commit()?;
        tracing::info!(class_id, count, "班级编排选项已保存");
        Ok(count)
    }

    // ===== 全局配置 =====

    /// 界面语言 (默认 zh-CN)
    pub fn get_locale(&self) -> Result<String, Box<dyn Error>> {
        Ok(self
            .get_config_value(GLOBAL_SCOPE, config_keys::LOCALE)?
            .unwrap_or_else(|| "zh-CN".to_string()))
    }

    pub fn set_locale(&self, locale: &str) -> Result<(), Box<dyn Error>> {
        self.set_config_value(GLOBAL_SCOPE, config_keys::LOCALE, locale)
    }

    // ===== 快照 =====

    /// 获取作用域内所有配置的快照（JSON格式）
    pub fn get_config_snapshot(&self, scope_id: &str) -> Result<String, Box<dyn Error>> {
        let values = self.get_scope_values(scope_id)?;
        Ok(serde_json::to_string(&values)?)
    }

    /// 从配置快照恢复作用域配置
    ///
    /// # 返回
    /// - Ok(usize): 恢复的配置项数量
    pub fn restore_config_from_snapshot(&self, scope_id: &str, snapshot_json: &str) -> Result<usize, Box<dyn Error>> {
        let config_map: HashMap<String, String> = serde_json::from_str(snapshot_json)?;

        let mut conn = self.conn.lock().map_err(|e| format!("锁获取失败: {}", e))?;
        let tx = conn.transaction()?;

        let mut count = 0;
        for (key, value) in config_map.iter() {
            count += tx.execute(
                "INSERT INTO config_kv (scope_id, key, value) VALUES (?1, ?2, ?3)
                 ON CONFLICT(scope_id, key) DO UPDATE SET value = ?3",
                params![scope_id, key, value],
            )?;
        }

        tx.commit()?;
        Ok(count)
    }

    fn get_scope_values(&self, scope_id: &str) -> Result<HashMap<String, String>, Box<dyn Error>> {
        let conn = self.conn.lock().map_err(|e| format!("锁获取失败: {}", e))?;

        let mut stmt = conn.prepare("SELECT key, value FROM config_kv WHERE scope_id = ?1 ORDER BY key")?;
        let rows = stmt.query_map(params![scope_id], |row| {
            Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?))
        })?;

        let mut values = HashMap::new();
        for row in rows {
            let (key, value) = row?;
            values.insert(key, value);
        }
        Ok(values)
    }
}

fn parse_or_default<T, F>(values: &HashMap<String, String>, key: &str, default: T, parse: F) -> T
where
    F: Fn(&str) -> Option<T>,
{
    match values.get(key) {
        None => default,
        Some(raw) => parse(raw).unwrap_or_else(|| {
            tracing::warn!(config_key = key, raw_value = %raw, "配置格式错误，使用默认值");
            default
        }),
    }
}

fn parse_bool(raw: &str) -> Option<bool> {
    match raw.trim().to_lowercase().as_str() {
        "true" | "1" | "yes" => Some(true),
        "false" | "0" | "no" => Some(false),
        _ => None,
    }
}

// ==========================================
// 配置键常量
// ==========================================
pub mod config_keys {
    // 布局
    pub const LAYOUT: &str = "layout";
    pub const PARTITION_COUNT: &str = "partition_count";
    pub const SEAT_COUNT: &str = "seat_count";

    // 编排策略
    pub const POLICY: &str = "policy";
    pub const SEED: &str = "seed";

    // 历史避让
    pub const AVOID_PREV_SEAT: &str = "avoid_prev_seat";
    pub const AVOID_PREV_PARTNER: &str = "avoid_prev_partner";

    // 全局
    pub const LOCALE: &str = "locale";
}
