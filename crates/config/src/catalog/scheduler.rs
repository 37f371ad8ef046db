//! 调度服务配置选项目录
//!
//! 声明调度服务的全部可调参数，分布在四个分组中：默认分组、服务间 API 版本上限、
//! 可信计算/远程证明参数，以及基于指标的权重参数。
//! 过滤器和权重器名称只是不透明的字符串标识，解析为具体实现由外部驱动负责。

use scheduler_errors::ConfigResult;
use scheduler_observability::StructuredLogger;

use crate::group::OptionGroup;
use crate::introspection::{GroupListing, OptionCatalog};
use crate::opts::OptionDescriptor;
use crate::registry::{Registry, DEFAULT_GROUP};

pub const DEFAULT_GROUP_NAME: &str = DEFAULT_GROUP;
pub const METRICS_GROUP_NAME: &str = "metrics";
pub const TRUSTED_GROUP_NAME: &str = "trusted_computing";
pub const UPGRADE_GROUP_NAME: &str = "upgrade_levels";

pub const TRUSTED_GROUP_TITLE: &str = "Trust parameters";

/// `metrics.required` 为 false 时，指标不可用的主机得到的权重，保留历史取值
pub const WEIGHT_OF_UNAVAILABLE_DEFAULT: f64 = -10000.0;

const ONLY_FILTER_SCHEDULER: &str = "This option is only used by the FilterScheduler and its \
subclasses; if you use a different scheduler, this option has no effect.";

fn scheduler_help(body: &str, related: &str) -> String {
    format!(
        "{body}\n\n* Services that use this:\n\n    ``scheduler``\n\n* Related options:\n\n    {related}\n"
    )
}

fn filter_scheduler_help(body: &str, related: &str) -> String {
    scheduler_help(&format!("{body}\n\n{ONLY_FILTER_SCHEDULER}"), related)
}

/// 默认分组中的选项，按文档顺序排列
pub fn default_opts() -> ConfigResult<Vec<OptionDescriptor>> {
    Ok(vec![
        OptionDescriptor::integer("scheduler_host_subset_size")
            .default_value(1)
            .help(filter_scheduler_help(
                "New instances will be scheduled on a host chosen randomly from a subset of \
the N best hosts, where N is the value set by this option. Valid values are 1 or greater. \
Any value less than one will be treated as 1.\n\n\
Setting this to a value greater than 1 will reduce the chance that multiple scheduler \
processes handling similar requests will select the same host, creating a potential race \
condition. By selecting a host randomly from the N hosts that best fit the request, the \
chance of a conflict is reduced. However, the higher you set this value, the less optimal \
the chosen host may be for a given request.",
                "None",
            ))
            .build()?,
        OptionDescriptor::list("baremetal_scheduler_default_filters")
            .default_value(vec![
                "RetryFilter",
                "AvailabilityZoneFilter",
                "ComputeFilter",
                "ComputeCapabilitiesFilter",
                "ImagePropertiesFilter",
                "ExactRamFilter",
                "ExactDiskFilter",
                "ExactCoreFilter",
            ])
            .help(filter_scheduler_help(
                "This option specifies the filters used for filtering baremetal hosts. The \
value should be a list of strings, with each string being the name of a filter class to be \
used. When used, they will be applied in order, so place your most restrictive filters first \
to make the filtering process more efficient.",
                "If the 'scheduler_use_baremetal_filters' option is False, this option has \
no effect.",
            ))
            .build()?,
        OptionDescriptor::boolean("scheduler_use_baremetal_filters")
            .default_value(false)
            .help(filter_scheduler_help(
                "Set this to True to tell the scheduler that it should use the filters \
specified in the 'baremetal_scheduler_default_filters' option. If you are not scheduling \
baremetal nodes, leave this at the default setting of False.",
                "If this option is set to True, then the filters specified in the \
'baremetal_scheduler_default_filters' are used instead of the filters specified in \
'scheduler_default_filters'.",
            ))
            .build()?,
        OptionDescriptor::multi_string("scheduler_available_filters")
            .default_value(vec!["nova.scheduler.filters.all_filters"])
            .help(filter_scheduler_help(
                "This is an unordered list of the filter classes the scheduler may apply. \
Only the filters specified in the 'scheduler_default_filters' option will be used, but any \
filter appearing in that option must also be included in this list.\n\n\
By default, this is set to all filters that are included with the scheduler. If you wish to \
change this, replace this with a list of strings, where each element is the path to a filter.",
                "scheduler_default_filters",
            ))
            .build()?,
        OptionDescriptor::list("scheduler_default_filters")
            .default_value(vec![
                "RetryFilter",
                "AvailabilityZoneFilter",
                "RamFilter",
                "DiskFilter",
                "ComputeFilter",
                "ComputeCapabilitiesFilter",
                "ImagePropertiesFilter",
                "ServerGroupAntiAffinityFilter",
                "ServerGroupAffinityFilter",
            ])
            .help(filter_scheduler_help(
                "This option is the list of filter class names that will be used for \
filtering hosts. The use of 'default' in the name of this option implies that other \
filters may sometimes be used, but that is not the case. These filters will be applied in \
the order they are listed, so place your most restrictive filters first to make the \
filtering process more efficient.",
                "All of the filters in this option *must* be present in the \
'scheduler_available_filters' option, or a SchedulerHostFilterNotFound exception will be \
raised.",
            ))
            .build()?,
        OptionDescriptor::list("scheduler_weight_classes")
            .default_value(vec!["nova.scheduler.weights.all_weighers"])
            .help(filter_scheduler_help(
                "This is a list of weigher class names. Only hosts which pass the filters \
are weighed. The weight for any host starts at 0, and the weighers order these hosts by \
adding to or subtracting from the weight assigned by the previous weigher. Weights may \
become negative.\n\n\
An instance will be scheduled to one of the N most-weighted hosts, where N is \
'scheduler_host_subset_size'.",
                "None",
            ))
            .build()?,
        OptionDescriptor::boolean("scheduler_tracks_instance_changes")
            .default_value(true)
            .help(filter_scheduler_help(
                "The scheduler may need information about the instances on a host in order \
to evaluate its filters and weighers. The most common need for this information is for the \
(anti-)affinity filters, which need to choose a host based on the instances already running \
on a host.\n\n\
If the configured filters and weighers do not need this information, disabling this option \
will improve performance. It may also be disabled when the tracking overhead proves too \
heavy, although this will cause classes requiring host usage data to query the database on \
each request instead.",
                "None",
            ))
            .build()?,
        OptionDescriptor::string("scheduler_topic")
            .default_value("scheduler")
            .help(scheduler_help(
                "This is the message queue topic that the scheduler 'listens' on. It is used \
when the scheduler service is started up to configure the queue, and whenever an RPC call to \
the scheduler is made. There is almost never any reason to ever change this value.",
                "None",
            ))
            .build()?,
        OptionDescriptor::string("scheduler_host_manager")
            .default_value("nova.scheduler.host_manager.HostManager")
            .help("The scheduler host manager class to use")
            .build()?,
        OptionDescriptor::string("scheduler_driver")
            .default_value("nova.scheduler.filter_scheduler.FilterScheduler")
            .help("Default driver to use for the scheduler")
            .build()?,
        OptionDescriptor::integer("scheduler_driver_task_period")
            .default_value(60)
            .help(
                "How often (in seconds) to run periodic tasks in the scheduler driver of your \
choice. Please note this is likely to interact with the value of service_down_time, but \
exactly how they interact will depend on your choice of scheduler driver.",
            )
            .build()?,
        OptionDescriptor::string("scheduler_json_config_location")
            .default_value("")
            .help(scheduler_help(
                "The absolute path to the scheduler configuration JSON file, if any. This \
file location is monitored by the scheduler for changes and reloads it if needed. It is \
converted from JSON to a generic data structure, and passed into the filtering and weighing \
functions of the scheduler, which can use it for dynamic configuration.",
                "None",
            ))
            .build()?,
        OptionDescriptor::float("disk_allocation_ratio")
            .default_value(1.0)
            .help("Virtual disk to physical disk allocation ratio")
            .build()?,
        OptionDescriptor::list("isolated_images")
            .default_value(Vec::<String>::new())
            .help("Images to run on isolated host")
            .build()?,
        OptionDescriptor::list("isolated_hosts")
            .default_value(Vec::<String>::new())
            .help("Host reserved for specific images")
            .build()?,
        OptionDescriptor::boolean("restrict_isolated_hosts_to_isolated_images")
            .default_value(true)
            .help("Whether to force isolated hosts to run only isolated images")
            .build()?,
        OptionDescriptor::integer("max_io_ops_per_host")
            .default_value(8)
            .help(
                "Tells filters to ignore hosts that have this many or more instances \
currently in build, resize, snapshot, migrate, rescue or unshelve task states",
            )
            .build()?,
        OptionDescriptor::string("aggregate_image_properties_isolation_namespace")
            .help("Force the filter to consider only keys matching the given namespace.")
            .build()?,
        OptionDescriptor::string("aggregate_image_properties_isolation_separator")
            .default_value(".")
            .help("The separator used between the namespace and keys")
            .build()?,
        OptionDescriptor::integer("max_instances_per_host")
            .default_value(50)
            .help("Ignore hosts that have too many instances")
            .build()?,
        OptionDescriptor::float("ram_weight_multiplier")
            .default_value(1.0)
            .help("Multiplier used for weighing ram. Negative numbers mean to stack vs spread.")
            .build()?,
        OptionDescriptor::float("io_ops_weight_multiplier")
            .default_value(-1.0)
            .help(
                "Multiplier used for weighing host io ops. Negative numbers mean a \
preference to choose light workload compute hosts.",
            )
            .build()?,
        OptionDescriptor::integer("scheduler_max_attempts")
            .default_value(3)
            .min(1)
            .help("Maximum number of attempts to schedule an instance")
            .build()?,
        OptionDescriptor::float("soft_affinity_weight_multiplier")
            .default_value(1.0)
            .help(
                "Multiplier used for weighing hosts for group soft-affinity. Only a positive \
value is meaningful. Negative means that the behavior will change to the opposite, which is \
soft-anti-affinity.",
            )
            .build()?,
        OptionDescriptor::float("soft_anti_affinity_weight_multiplier")
            .default_value(1.0)
            .help(
                "Multiplier used for weighing hosts for group soft-anti-affinity. Only a \
positive value is meaningful. Negative means that the behavior will change to the opposite, \
which is soft-affinity.",
            )
            .build()?,
    ])
}

/// 发往调度服务的消息版本上限（`upgrade_levels` 分组）
pub fn rpcapi_cap_opt() -> ConfigResult<OptionDescriptor> {
    OptionDescriptor::string("scheduler")
        .help("Set a version cap for messages sent to scheduler services")
        .build()
}

pub fn trust_group() -> OptionGroup {
    OptionGroup::new(TRUSTED_GROUP_NAME).with_title(TRUSTED_GROUP_TITLE)
}

pub fn trusted_opts() -> ConfigResult<Vec<OptionDescriptor>> {
    Ok(vec![
        OptionDescriptor::string("attestation_server")
            .help("Attestation server HTTP")
            .build()?,
        OptionDescriptor::string("attestation_server_ca_file")
            .help("Attestation server Cert file for Identity verification")
            .build()?,
        OptionDescriptor::string("attestation_port")
            .default_value("8443")
            .help("Attestation server port")
            .build()?,
        OptionDescriptor::string("attestation_api_url")
            .default_value("/OpenAttestationWebServices/V1.0")
            .help("Attestation web API URL")
            .build()?,
        OptionDescriptor::string("attestation_auth_blob")
            .help("Attestation authorization blob - must change")
            .build()?,
        OptionDescriptor::integer("attestation_auth_timeout")
            .default_value(60)
            .help("Attestation status cache valid period length")
            .build()?,
        OptionDescriptor::boolean("attestation_insecure_ssl")
            .default_value(false)
            .help("Disable SSL cert verification for Attestation service")
            .build()?,
    ])
}

pub fn metrics_weight_opts() -> ConfigResult<Vec<OptionDescriptor>> {
    Ok(vec![
        OptionDescriptor::float("weight_multiplier")
            .default_value(1.0)
            .help("Multiplier used for weighing metrics.")
            .build()?,
        OptionDescriptor::list("weight_setting")
            .default_value(Vec::<String>::new())
            .help(
                "How the metrics are going to be weighed. This should be in the form of \
'<name1>=<ratio1>, <name2>=<ratio2>, ...', where <nameX> is one of the metrics to be \
weighed, and <ratioX> is the corresponding ratio. So for 'name1=1.0, name2=-1.0' The final \
weight would be name1.value * 1.0 + name2.value * -1.0.",
            )
            .build()?,
        OptionDescriptor::boolean("required")
            .default_value(true)
            .help(
                "How to treat the unavailable metrics. When a metric is NOT available for a \
host, if it is set to be True, it would raise an exception, so it is recommended to use the \
scheduler filter MetricFilter to filter out those hosts. If it is set to be False, the \
unavailable metric would be treated as a negative factor in weighing process, the returned \
value would be set by the option weight_of_unavailable.",
            )
            .build()?,
        OptionDescriptor::float("weight_of_unavailable")
            .default_value(WEIGHT_OF_UNAVAILABLE_DEFAULT)
            .help(
                "The final weight value to be returned if required is set to False and any \
one of the metrics set by weight_setting is unavailable.",
            )
            .build()?,
    ])
}

/// 把完整的调度器选项目录注册到 `registry`
pub fn register_opts(registry: &Registry) -> ConfigResult<()> {
    registry.register_opts(default_opts()?, DEFAULT_GROUP_NAME)?;
    registry.register_opt(rpcapi_cap_opt()?, UPGRADE_GROUP_NAME)?;
    registry.register_group(trust_group())?;
    registry.register_opts(trusted_opts()?, TRUSTED_GROUP_NAME)?;
    registry.register_opts(metrics_weight_opts()?, METRICS_GROUP_NAME)?;

    StructuredLogger::log_catalog_registered(registry.group_count(), registry.option_count());
    Ok(())
}

/// 不依赖注册中心的静态目录结构
pub fn list_opts() -> ConfigResult<OptionCatalog> {
    Ok(OptionCatalog::new(vec![
        GroupListing::new(DEFAULT_GROUP_NAME, default_opts()?),
        GroupListing::new(UPGRADE_GROUP_NAME, vec![rpcapi_cap_opt()?]),
        GroupListing::new(TRUSTED_GROUP_NAME, trusted_opts()?).with_title(TRUSTED_GROUP_TITLE),
        GroupListing::new(METRICS_GROUP_NAME, metrics_weight_opts()?),
    ]))
}
